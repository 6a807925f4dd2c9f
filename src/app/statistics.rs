//! End-of-run statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, ProcessingStats, WarningType};

/// Logs the non-zero error and warning counters.
pub fn print_error_statistics(stats: &ProcessingStats) {
    let total_errors = stats.total_errors();
    let total_warnings = stats.total_warnings();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_warnings > 0 {
        info!("Warning Counts ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }
}

/// One-line summary of the run.
pub fn print_simple_summary(total: usize, successful: usize, failed: usize, elapsed_seconds: f64) {
    info!(
        "✅ Scanned {} domain{} ({} succeeded, {} failed) in {:.1}s",
        total,
        if total == 1 { "" } else { "s" },
        successful,
        failed,
        elapsed_seconds
    );
}
