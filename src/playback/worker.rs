//! Audio output workers.
//!
//! A worker owns the decode-and-output pipeline for exactly one track:
//! it opens the output device, feeds the decoded file into a sink and
//! reports progress and terminal events back to the engine, tagged with
//! its generation. Cancellation is cooperative: the worker checks its
//! control channel between progress ticks and releases the device by
//! dropping the sink and stream on the way out.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::library::Track;

use super::sink::decode_track;
use super::types::{CommandError, EngineMsg, PlaybackError, WorkerCtl, WorkerEvent};

/// How often a live worker publishes its position.
pub(super) const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// Everything a worker needs to start playing one track.
pub(super) struct SpawnRequest {
    pub generation: u64,
    pub track: Track,
    pub volume: u8,
    pub start_paused: bool,
}

/// The engine's grip on a live worker.
pub(super) struct WorkerHandle {
    pub generation: u64,
    pub ctl: Sender<WorkerCtl>,
    pub join: JoinHandle<()>,
}

/// Seam between the engine's state machine and the audio backend. The
/// tests substitute a scripted implementation so the state machine can
/// be exercised without an output device.
pub(super) trait Spawn: Send {
    fn spawn(&mut self, req: SpawnRequest, events: Sender<EngineMsg>) -> WorkerHandle;
}

/// Production spawner: one thread per track, rodio output.
pub(super) struct RodioSpawner;

impl Spawn for RodioSpawner {
    fn spawn(&mut self, req: SpawnRequest, events: Sender<EngineMsg>) -> WorkerHandle {
        let (ctl_tx, ctl_rx) = mpsc::channel();
        let generation = req.generation;
        let join = thread::spawn(move || run_worker(req, ctl_rx, events));
        WorkerHandle {
            generation,
            ctl: ctl_tx,
            join,
        }
    }
}

fn volume_scale(volume: u8) -> f32 {
    f32::from(volume.min(100)) / 100.0
}

fn run_worker(req: SpawnRequest, ctl: Receiver<WorkerCtl>, events: Sender<EngineMsg>) {
    let generation = req.generation;
    let send = |event: WorkerEvent| {
        let _ = events.send(EngineMsg::Worker { generation, event });
    };

    // The device is owned by this worker alone; the engine guarantees
    // the previous worker was torn down before spawning this one.
    let stream = match OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            send(WorkerEvent::Failed(PlaybackError::DeviceUnavailable(
                e.to_string(),
            )));
            return;
        }
    };
    // rodio logs to stderr when OutputStream is dropped. That's useful in
    // debugging, but noisy for a TUI app.
    let mut stream = stream;
    stream.log_on_drop(false);

    let source = match decode_track(&req.track) {
        Ok(source) => source,
        Err(e) => {
            send(WorkerEvent::Failed(e));
            return;
        }
    };

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume_scale(req.volume));
    sink.append(source);
    if req.start_paused {
        sink.pause();
    } else {
        sink.play();
    }
    send(WorkerEvent::Ready);

    loop {
        match ctl.recv_timeout(PROGRESS_INTERVAL) {
            Ok(WorkerCtl::Pause) => sink.pause(),
            Ok(WorkerCtl::Resume) => sink.play(),
            Ok(WorkerCtl::SetVolume(v)) => sink.set_volume(volume_scale(v)),
            Ok(WorkerCtl::Seek(target, reply)) => match sink.try_seek(target) {
                Ok(()) => {
                    let _ = reply.send(Ok(()));
                    send(WorkerEvent::Progress(sink.get_pos()));
                }
                Err(rodio::source::SeekError::NotSupported { .. }) => {
                    let _ = reply.send(Err(CommandError::SeekUnsupported));
                }
                Err(e) => {
                    // Best-effort seek: playback continues from wherever
                    // the sink ended up.
                    warn!(error = %e, "seek failed, continuing");
                    let _ = reply.send(Ok(()));
                }
            },
            // Cancel (or a vanished engine) ends the worker immediately.
            // Nothing is sent after this point; dropping the sink and
            // stream releases the output device.
            Ok(WorkerCtl::Cancel) | Err(RecvTimeoutError::Disconnected) => {
                debug!(generation, "worker canceled");
                return;
            }
            Err(RecvTimeoutError::Timeout) => {
                if sink.empty() {
                    send(WorkerEvent::Completed);
                    return;
                }
                send(WorkerEvent::Progress(sink.get_pos()));
            }
        }
    }
}
