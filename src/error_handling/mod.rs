//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions for each boundary (config, loading, probes, storage)
//! - Processing statistics tracking (errors and warnings)
//!
//! Error types are categorized into:
//! - **Errors**: failures that turn a domain into an `ERROR` record
//! - **Warnings**: PQC or GeoIP degradations that leave the domain graded

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    ConfigError, DatabaseError, ErrorType, GeoError, InitializationError, LoadError,
    PqcProbeError, ScanError, TlsProbeError, WarningType,
};
