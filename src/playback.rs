//! The playback engine.
//!
//! All playback state lives in one engine thread: commands from the UI
//! and events from the audio output worker are serialized through a
//! single channel, so [`PlaybackState`] has exactly one writer and
//! readers only ever see consistent snapshots.
//!
//! The audio output worker owns the decode-and-output pipeline for one
//! track at a time. Worker instances are tagged with a generation
//! counter; after a transition, events from the replaced worker no
//! longer match and are discarded.

mod engine;
mod player;
mod sink;
mod types;
mod worker;

pub use player::Player;
pub use types::{CommandError, PlaybackError, PlaybackState, PlaybackStatus, StateHandle};
