//! PixiAlbum Logging & Observability Module
//!
//! Provides structured logging, panic handling, crash reports, and deadlock detection.

mod deadlock;
mod panic_hook;
mod logging;

pub use deadlock::{report_deadlocks, spawn_deadlock_watch};
pub use panic_hook::init_panic_hook;
pub use logging::{init_logging, cleanup_old_logs, cleanup_logs_in, LogGuard};

use std::path::PathBuf;
use directories::ProjectDirs;

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "PixiAlbum", "PixiAlbum")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize all observability features
///
/// The returned guard flushes the log file when dropped; keep it alive
/// until the process exits.
pub fn init() -> anyhow::Result<LogGuard> {
    let guard = init_logging()?;
    init_panic_hook();

    #[cfg(debug_assertions)]
    if let Err(e) = spawn_deadlock_watch(std::time::Duration::from_secs(10)) {
        tracing::warn!("Deadlock watch not started: {}", e);
    }

    Ok(guard)
}
