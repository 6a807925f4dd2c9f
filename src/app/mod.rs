//! Main application helpers.
//!
//! Progress logging, shutdown of background tasks and end-of-run statistics.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::{log_progress, spawn_progress_logger};
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_error_statistics, print_simple_summary};
