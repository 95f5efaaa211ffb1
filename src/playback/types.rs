//! Playback-related types: state, commands, errors and handles.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::library::TrackId;

/// What the player is doing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing is playing. The queue position is kept so playback can
    /// resume where it stopped.
    Stopped,
    /// A worker is being brought up for the current queue position.
    Loading,
    Playing,
    Paused,
    /// Playback failed. Recovery requires an explicit command; the
    /// engine never retries or skips on its own.
    Error(PlaybackError),
}

/// The engine's single source of truth for "what is playing, where, at
/// what volume". Mutated only by the engine thread; everyone else reads
/// snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Index into the active queue. `None` until a queue is loaded.
    pub queue_position: Option<usize>,
    /// Position inside the current track, updated from worker progress
    /// events. Frozen while paused, reset on transitions and stop.
    pub elapsed: Duration,
    /// Always within `0..=100`.
    pub volume: u8,
    /// Human-readable form of the most recent playback error.
    pub last_error: Option<String>,
}

impl PlaybackState {
    pub(super) fn new(volume: u8) -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            queue_position: None,
            elapsed: Duration::ZERO,
            volume: volume.min(100),
            last_error: None,
        }
    }
}

/// Shared snapshot handle; the engine republishes after every mutation.
pub type StateHandle = Arc<Mutex<PlaybackState>>;

/// Synchronous command failures, returned directly to the caller. These
/// never move [`PlaybackStatus`] to `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("start index is out of bounds for the queue")]
    InvalidIndex,
    #[error("the playback queue is empty")]
    EmptyQueue,
    #[error("the current track does not support seeking")]
    SeekUnsupported,
}

/// Asynchronous playback failures, surfaced via
/// [`PlaybackStatus::Error`]. None of these are fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("unreadable file: {0}")]
    UnreadableFile(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("decode failed: {0}")]
    DecodeError(String),
}

/// Channel a command caller is answered on.
pub(super) type Reply = Sender<Result<(), CommandError>>;

#[derive(Debug)]
pub(super) enum Command {
    Load {
        queue: Vec<TrackId>,
        start_index: usize,
    },
    PlayPause,
    Stop,
    Next,
    Prev,
    SeekTo(Duration),
    SetVolume(u8),
    Shutdown,
}

/// Events a worker reports back to the engine.
#[derive(Debug)]
pub(super) enum WorkerEvent {
    /// Output device opened, playback begun (possibly paused).
    Ready,
    /// Periodic position report while the worker is alive.
    Progress(Duration),
    /// The track played to its natural end.
    Completed,
    /// The worker gave up; it exits right after sending this.
    Failed(PlaybackError),
}

/// Everything that flows into the engine thread.
#[derive(Debug)]
pub(super) enum EngineMsg {
    Cmd { cmd: Command, reply: Reply },
    Worker { generation: u64, event: WorkerEvent },
}

/// Control messages the engine sends to the active worker.
#[derive(Debug)]
pub(super) enum WorkerCtl {
    Pause,
    Resume,
    /// The reply channel belongs to the command caller: the worker
    /// answers seeks directly so the engine never waits on the backend.
    Seek(Duration, Reply),
    SetVolume(u8),
    Cancel,
}
