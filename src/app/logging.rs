//! Progress logging utilities.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::scan::ScanProgress;

/// Logs how many domains have been scanned so far and the current rate.
pub fn log_progress(start_time: Instant, progress: &ScanProgress) {
    info!("{}", progress_line(start_time.elapsed().as_secs_f64(), progress));
}

/// Failed domains count as scanned.
fn progress_line(elapsed_secs: f64, progress: &ScanProgress) -> String {
    let scanned = progress.scanned();
    let rate = if elapsed_secs > 0.0 {
        scanned as f64 / elapsed_secs
    } else {
        0.0
    };
    format!(
        "Scanned {}/{} domains ({} failed) in {:.2} seconds (~{:.2} domains/sec)",
        scanned,
        progress.total(),
        progress.failed(),
        elapsed_secs,
        rate
    )
}

/// Logs progress every `interval` until `cancel` fires.
pub fn spawn_progress_logger(
    progress: Arc<ScanProgress>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let start_time = Instant::now();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => log_progress(start_time, &progress),
            }
        }
    })
}
