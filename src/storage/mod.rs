//! SQLite persistence.
//!
//! This module provides:
//! - Pool setup (WAL mode, file created on first use) and migrations
//! - Run metadata and final run statistics
//! - Append-only scan records, one transaction per record
//! - Cached aggregate snapshots per run

pub mod migrations;
pub mod pool;
mod record;
mod run;
mod snapshot;
#[cfg(test)]
pub(crate) mod test_helpers;

pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use record::insert_scan_record;
pub use run::{
    insert_run_metadata, query_run_history, update_run_stats, RunMetadata, RunStats, RunSummary,
};
pub use snapshot::{insert_statistics_snapshot, load_latest_snapshot};
