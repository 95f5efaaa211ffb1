//! Decoding helpers for the audio output worker.
//!
//! Opening and decoding a track is where most playback failures happen;
//! this maps them into the engine's error taxonomy.

use std::fs::File;
use std::io::BufReader;

use rodio::Decoder;
use rodio::decoder::DecoderError;

use crate::library::Track;

use super::types::PlaybackError;

/// Open `track` and build a decoder for it.
pub(super) fn decode_track(track: &Track) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(&track.path)
        .map_err(|e| PlaybackError::UnreadableFile(format!("{}: {e}", track.path.display())))?;

    Decoder::new(BufReader::new(file)).map_err(|e| match e {
        DecoderError::UnrecognizedFormat => {
            PlaybackError::UnsupportedFormat(track.path.display().to_string())
        }
        DecoderError::IoError(msg) => {
            PlaybackError::UnreadableFile(format!("{}: {msg}", track.path.display()))
        }
        other => PlaybackError::DecodeError(other.to_string()),
    })
}
