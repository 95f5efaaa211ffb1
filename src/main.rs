use anyhow::Result;

mod app;
mod config;
mod library;
mod logging;
mod playback;
mod playlist;
mod runtime;
mod ui;

fn main() -> Result<()> {
    // Keep the guard around so buffered log lines are flushed on exit.
    let _log_guard = logging::init()?;

    runtime::run()
}
