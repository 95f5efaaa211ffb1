use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::PlaybackSettings;
use crate::library::{Catalog, TrackId};

use super::engine::Engine;
use super::types::{Command, CommandError, EngineMsg, PlaybackState, StateHandle};
use super::worker::{RodioSpawner, Spawn};

/// Handle to the playback engine thread.
///
/// Commands are answered synchronously, after the engine has applied
/// and published their effect. [`Player::snapshot`] never waits on the
/// engine or the audio backend; it reads the last-published state.
pub struct Player {
    pub(super) tx: Sender<EngineMsg>,
    shared: StateHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    pub fn new(catalog: Arc<Catalog>, settings: &PlaybackSettings) -> Self {
        Self::with_spawner(catalog, settings, Box::new(RodioSpawner))
    }

    pub(super) fn with_spawner(
        catalog: Arc<Catalog>,
        settings: &PlaybackSettings,
        spawner: Box<dyn Spawn>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<EngineMsg>();
        let shared: StateHandle = Arc::new(Mutex::new(PlaybackState::new(settings.volume)));

        let engine = Engine::new(catalog, settings, spawner, rx, tx.clone(), shared.clone());
        let join = std::thread::spawn(move || engine.run());

        Self {
            tx,
            shared,
            join: Mutex::new(Some(join)),
        }
    }

    fn command(&self, cmd: Command) -> Result<(), CommandError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self
            .tx
            .send(EngineMsg::Cmd {
                cmd,
                reply: reply_tx,
            })
            .is_err()
        {
            // Engine already shut down; everything is a no-op now.
            return Ok(());
        }
        reply_rx.recv().unwrap_or(Ok(()))
    }

    /// Replace the active queue and start playing from `start_index`.
    /// An empty queue stops playback and clears the position.
    pub fn load(&self, queue: Vec<TrackId>, start_index: usize) -> Result<(), CommandError> {
        self.command(Command::Load { queue, start_index })
    }

    /// Toggle between playing and paused; starts playback when stopped
    /// or after an error. No-op on an empty queue.
    pub fn play_pause(&self) -> Result<(), CommandError> {
        self.command(Command::PlayPause)
    }

    /// Stop playback, reset elapsed, keep the queue position. Idempotent.
    pub fn stop(&self) -> Result<(), CommandError> {
        self.command(Command::Stop)
    }

    /// Advance to the next queue entry.
    pub fn next(&self) -> Result<(), CommandError> {
        self.command(Command::Next)
    }

    /// Go back to the previous queue entry.
    pub fn prev(&self) -> Result<(), CommandError> {
        self.command(Command::Prev)
    }

    /// Seek inside the current track. Best-effort: formats that cannot
    /// seek report [`CommandError::SeekUnsupported`].
    pub fn seek_to(&self, target: Duration) -> Result<(), CommandError> {
        self.command(Command::SeekTo(target))
    }

    /// Set the volume, clamped to `0..=100`.
    pub fn set_volume(&self, volume: u8) -> Result<(), CommandError> {
        self.command(Command::SetVolume(volume))
    }

    /// A consistent copy of the current playback state.
    pub fn snapshot(&self) -> PlaybackState {
        self.shared
            .lock()
            .map(|state| state.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Shared handle for read-only observers; the UI reads this every
    /// frame without going through the command channel.
    pub fn state_handle(&self) -> StateHandle {
        self.shared.clone()
    }

    /// Stop playback and end the engine thread.
    pub fn shutdown(&self) {
        let _ = self.command(Command::Shutdown);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}
