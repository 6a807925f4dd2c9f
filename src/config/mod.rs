//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, default paths)
//! - The `Config` struct used by both the library and the CLI

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{default_pqcscan_path, Config, LogFormat, LogLevel};
