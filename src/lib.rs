//! pqc_scanner library: TLS and post-quantum readiness scanning of ranked domains.
//!
//! For every domain in a ranked list the scanner records the supported
//! SSL/TLS versions, accepted cipher suites, the leaf certificate and its
//! issuer class, post-quantum key-exchange support and (optionally) the
//! server's location, then assigns a security grade. Results are stored in
//! SQLite and folded into an aggregate snapshot.
//!
//! # Example
//!
//! ```no_run
//! use pqc_scanner::{run_scan, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: std::path::PathBuf::from("majestic_million.csv"),
//!     limit: Some(100),
//!     max_concurrency: 10,
//!     ..Default::default()
//! };
//!
//! let report = run_scan(config).await?;
//! println!(
//!     "Scanned {} domains: {} graded, {} failed, PQC adoption {:.1}%",
//!     report.total, report.successful, report.failed, report.snapshot.pqc_adoption_rate
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod aggregate;
mod app;
pub mod config;
pub mod domain;
pub mod error_handling;
pub mod export;
pub mod geoip;
pub mod initialization;
pub mod models;
pub mod probe;
mod run;
pub mod scan;
pub mod security;
pub mod storage;

// Re-export public API
pub use aggregate::{aggregate, AggregateSnapshot, ScanSummary};
pub use config::{Config, LogFormat, LogLevel};
pub use domain::DomainLoader;
pub use models::{DomainEntry, Grade, ScanRecord, ScanStatus};
pub use run::{init_probes, run_scan, run_scan_with, GeoBackend, PqcBackend, ScanProbes, ScanReport};
pub use scan::{Orchestrator, ScanSettings};
pub use storage::{query_run_history, run_migrations, RunSummary};
