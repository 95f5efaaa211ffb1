//! File-based tracing setup.
//!
//! Logs go to a daily-rotated file under the data directory instead of
//! stderr, which would tear the TUI. Filtering follows `RUST_LOG` when
//! set, defaulting to info with crate-level debug.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tremolo")
        .join("logs")
}

/// Initialize the global subscriber. The returned guard must be kept
/// alive for the lifetime of the process so buffered lines get flushed.
pub fn init() -> Result<WorkerGuard> {
    let dir = log_dir();
    fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::daily(&dir, "tremolo.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tremolo=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}
