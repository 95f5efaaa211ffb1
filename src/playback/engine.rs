//! The playback state machine.
//!
//! One engine instance runs on its own thread. Commands and worker
//! events arrive on the same channel and are handled strictly in
//! order, so `PlaybackState` is never mutated concurrently with itself
//! and no lock is held across a state transition.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::PlaybackSettings;
use crate::library::{Catalog, TrackId};

use super::types::{
    Command, CommandError, EngineMsg, PlaybackError, PlaybackState, PlaybackStatus, Reply,
    StateHandle, WorkerCtl, WorkerEvent,
};
use super::worker::{Spawn, SpawnRequest, WorkerHandle};

/// Upper bound on waiting for a canceled worker to exit and release the
/// output device.
pub(super) const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(2);

pub(super) struct Engine {
    rx: Receiver<EngineMsg>,
    /// Cloned into every spawned worker so events land on the same
    /// channel as commands.
    events_tx: Sender<EngineMsg>,
    shared: StateHandle,
    state: PlaybackState,
    queue: Vec<TrackId>,
    catalog: Arc<Catalog>,
    spawner: Box<dyn Spawn>,
    worker: Option<WorkerHandle>,
    /// Bumped on every spawn; only events carrying the live worker's
    /// generation may mutate state.
    generation: u64,
    /// Whether the in-flight worker should come up paused; doubles as
    /// the paused intent preserved across transitions.
    pending_paused: bool,
    wrap_navigation: bool,
    loop_queue: bool,
}

impl Engine {
    pub(super) fn new(
        catalog: Arc<Catalog>,
        settings: &PlaybackSettings,
        spawner: Box<dyn Spawn>,
        rx: Receiver<EngineMsg>,
        events_tx: Sender<EngineMsg>,
        shared: StateHandle,
    ) -> Self {
        Self {
            rx,
            events_tx,
            shared,
            state: PlaybackState::new(settings.volume),
            queue: Vec::new(),
            catalog,
            spawner,
            worker: None,
            generation: 0,
            pending_paused: false,
            wrap_navigation: settings.wrap_navigation,
            loop_queue: settings.loop_queue,
        }
    }

    pub(super) fn run(mut self) {
        self.publish();
        while let Ok(msg) = self.rx.recv() {
            match msg {
                EngineMsg::Cmd { cmd, reply } => {
                    if self.handle_command(cmd, reply) {
                        break;
                    }
                }
                EngineMsg::Worker { generation, event } => {
                    self.handle_worker_event(generation, event);
                    self.publish();
                }
            }
        }
        debug!("playback engine thread exiting");
    }

    /// Copy the authoritative state into the shared snapshot. Called
    /// after every mutation and before replying, so a caller that got
    /// its answer already sees the effect.
    fn publish(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            *shared = self.state.clone();
        }
    }

    /// Returns `true` when the engine should shut down.
    fn handle_command(&mut self, cmd: Command, reply: Reply) -> bool {
        let result = match cmd {
            Command::Load { queue, start_index } => self.load(queue, start_index),
            Command::PlayPause => self.play_pause(),
            Command::Stop => {
                self.stop();
                Ok(())
            }
            Command::Next => self.step(true),
            Command::Prev => self.step(false),
            Command::SeekTo(target) => {
                // The worker answers the caller directly; nothing to
                // publish here since no state changed yet.
                self.seek_to(target, reply);
                return false;
            }
            Command::SetVolume(volume) => {
                self.set_volume(volume);
                Ok(())
            }
            Command::Shutdown => {
                info!("playback engine shutting down");
                self.teardown_worker();
                self.publish();
                let _ = reply.send(Ok(()));
                return true;
            }
        };
        self.publish();
        let _ = reply.send(result);
        false
    }

    fn load(&mut self, queue: Vec<TrackId>, start_index: usize) -> Result<(), CommandError> {
        if queue.is_empty() {
            info!("empty queue loaded, stopping");
            self.teardown_worker();
            self.queue = queue;
            self.state.queue_position = None;
            self.state.elapsed = Duration::ZERO;
            self.state.status = PlaybackStatus::Stopped;
            self.pending_paused = false;
            return Ok(());
        }
        if start_index >= queue.len() {
            return Err(CommandError::InvalidIndex);
        }
        info!(tracks = queue.len(), start_index, "queue replaced");
        self.queue = queue;
        self.transition_to(start_index, false);
        Ok(())
    }

    fn play_pause(&mut self) -> Result<(), CommandError> {
        if self.queue.is_empty() {
            return Ok(());
        }
        match self.state.status {
            PlaybackStatus::Playing => {
                self.send_ctl(WorkerCtl::Pause);
                self.pending_paused = true;
                self.state.status = PlaybackStatus::Paused;
            }
            PlaybackStatus::Paused => {
                self.send_ctl(WorkerCtl::Resume);
                self.pending_paused = false;
                self.state.status = PlaybackStatus::Playing;
            }
            PlaybackStatus::Loading => {
                // A worker is already on its way up for this position;
                // make sure it comes up playing. Spawning again here
                // would race two workers for the output device.
                self.pending_paused = false;
                self.send_ctl(WorkerCtl::Resume);
            }
            PlaybackStatus::Stopped | PlaybackStatus::Error(_) => {
                let pos = self.state.queue_position.unwrap_or(0);
                self.transition_to(pos, false);
            }
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.teardown_worker();
        self.state.status = PlaybackStatus::Stopped;
        self.state.elapsed = Duration::ZERO;
        self.pending_paused = false;
        // queue_position stays put: play resumes from here.
    }

    fn step(&mut self, forward: bool) -> Result<(), CommandError> {
        if self.queue.is_empty() {
            return Err(CommandError::EmptyQueue);
        }
        let start_paused = match self.state.status {
            PlaybackStatus::Paused => true,
            PlaybackStatus::Loading => self.pending_paused,
            _ => false,
        };
        let len = self.queue.len();
        let cur = self.state.queue_position.unwrap_or(0);

        if forward {
            if cur + 1 < len {
                self.transition_to(cur + 1, start_paused);
            } else if self.wrap_navigation {
                self.transition_to(0, start_paused);
            } else {
                // Explicit stop-at-end variant: keep the last index.
                self.stop();
            }
        } else if cur > 0 {
            self.transition_to(cur - 1, start_paused);
        } else if self.wrap_navigation {
            self.transition_to(len - 1, start_paused);
        } else {
            // Without wrapping, prev at the start restarts the first track.
            self.transition_to(0, start_paused);
        }
        Ok(())
    }

    fn seek_to(&mut self, target: Duration, reply: Reply) {
        match &self.worker {
            Some(worker) => {
                // The reply sender travels to the worker; if the worker
                // just died its terminal event is already queued behind
                // this command and the caller's receiver simply closes.
                if worker.ctl.send(WorkerCtl::Seek(target, reply)).is_err() {
                    warn!("seek ignored: audio worker is gone");
                }
            }
            None => {
                warn!("seek ignored: no track loaded");
                let _ = reply.send(Ok(()));
            }
        }
    }

    fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.state.volume = volume;
        self.send_ctl(WorkerCtl::SetVolume(volume));
    }

    fn send_ctl(&self, ctl: WorkerCtl) {
        if let Some(worker) = &self.worker {
            // A dead worker is fine: its terminal event is already queued.
            let _ = worker.ctl.send(ctl);
        }
    }

    fn handle_worker_event(&mut self, generation: u64, event: WorkerEvent) {
        let current = self.worker.as_ref().map(|w| w.generation);
        if current != Some(generation) {
            debug!(generation, ?current, "discarding event from stale worker");
            return;
        }
        match event {
            WorkerEvent::Ready => {
                self.state.status = if self.pending_paused {
                    PlaybackStatus::Paused
                } else {
                    PlaybackStatus::Playing
                };
                debug!(generation, status = ?self.state.status, "worker ready");
            }
            WorkerEvent::Progress(elapsed) => {
                if matches!(
                    self.state.status,
                    PlaybackStatus::Playing | PlaybackStatus::Paused
                ) {
                    self.state.elapsed = elapsed;
                }
            }
            WorkerEvent::Completed => {
                debug!(generation, "track completed");
                self.advance_after_completion();
            }
            WorkerEvent::Failed(error) => {
                warn!(generation, %error, "worker failed");
                // The worker exits right after reporting; reap its handle.
                self.teardown_worker();
                self.state.last_error = Some(error.to_string());
                self.state.status = PlaybackStatus::Error(error);
                // queue_position stays put so retry and skip both know
                // which track is "current".
            }
        }
    }

    /// Natural end-of-track takes the same path as a user `next`,
    /// except at the end of a non-looping queue, where playback stops
    /// with the position left at the last index.
    fn advance_after_completion(&mut self) {
        let Some(pos) = self.state.queue_position else {
            self.stop();
            return;
        };
        if pos + 1 < self.queue.len() {
            self.transition_to(pos + 1, false);
        } else if self.loop_queue && !self.queue.is_empty() {
            self.transition_to(0, false);
        } else {
            self.stop();
        }
    }

    /// The one place workers are born: tear down the old worker, move
    /// the position, spawn under a fresh generation. `next`, `prev`,
    /// retry and natural advance all funnel through here.
    fn transition_to(&mut self, pos: usize, start_paused: bool) {
        self.teardown_worker();
        self.state.queue_position = Some(pos);
        self.state.elapsed = Duration::ZERO;
        self.pending_paused = start_paused;

        let id = self.queue[pos];
        let Some(track) = self.catalog.lookup(id) else {
            // Ids are not validated at enqueue time; a queue entry that
            // no longer resolves surfaces here, when it is reached.
            let error =
                PlaybackError::UnreadableFile(format!("{id:?} does not resolve in the catalog"));
            warn!(%error, "cannot start playback");
            self.state.last_error = Some(error.to_string());
            self.state.status = PlaybackStatus::Error(error);
            return;
        };
        let track = track.clone();

        self.generation += 1;
        self.state.status = PlaybackStatus::Loading;
        info!(
            generation = self.generation,
            track = %track.path.display(),
            start_paused,
            "starting worker"
        );
        let handle = self.spawner.spawn(
            SpawnRequest {
                generation: self.generation,
                track,
                volume: self.state.volume,
                start_paused,
            },
            self.events_tx.clone(),
        );
        self.worker = Some(handle);
    }

    /// Cancel the active worker and wait for it to release the output
    /// device. The wait is bounded: a wedged worker is abandoned with a
    /// warning rather than hanging the session. Either way the handle
    /// is dropped, so events from this generation can no longer match.
    fn teardown_worker(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = worker.ctl.send(WorkerCtl::Cancel);

        let deadline = Instant::now() + TEARDOWN_TIMEOUT;
        while !worker.join.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        if worker.join.is_finished() {
            let _ = worker.join.join();
        } else {
            warn!(
                generation = worker.generation,
                timeout = ?TEARDOWN_TIMEOUT,
                "worker did not stop in time; the output device may still be held"
            );
        }
    }
}
