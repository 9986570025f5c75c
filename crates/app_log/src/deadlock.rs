//! Lock-cycle watch for debug builds

use std::thread::{self, JoinHandle};
use std::time::Duration;

const WATCH_THREAD: &str = "pixialbum-deadlock-watch";

/// Log every `parking_lot` lock cycle found right now; returns how many
pub fn report_deadlocks() -> usize {
    let cycles = parking_lot::deadlock::check_deadlock();
    for (cycle, threads) in cycles.iter().enumerate() {
        for t in threads {
            tracing::error!(
                cycle,
                thread_id = ?t.thread_id(),
                backtrace = ?t.backtrace(),
                "Deadlocked thread"
            );
        }
    }
    if !cycles.is_empty() {
        tracing::error!(count = cycles.len(), "Deadlock detected");
    }
    cycles.len()
}

/// Run `report_deadlocks` every `interval` on a named background thread
pub fn spawn_deadlock_watch(interval: Duration) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(WATCH_THREAD.to_string())
        .spawn(move || loop {
            thread::sleep(interval);
            report_deadlocks();
        })
}
