//! Scan finalization.
//!
//! Persists the records and the snapshot, closes out the run row and writes
//! the optional exports.

use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use sqlx::SqlitePool;

use crate::aggregate::aggregate;
use crate::app::{print_error_statistics, print_simple_summary};
use crate::config::Config;
use crate::error_handling::ProcessingStats;
use crate::export::{export_snapshot_json, export_summaries_csv};
use crate::models::ScanRecord;
use crate::storage::{insert_scan_record, insert_statistics_snapshot, update_run_stats, RunStats};

use super::ScanReport;

/// Writes every record; a record that fails to save is logged and counted.
async fn persist_records(pool: &SqlitePool, run_id: &str, records: &[ScanRecord]) -> usize {
    let mut unsaved = 0;
    for record in records {
        if let Err(e) = insert_scan_record(pool, Some(run_id), record).await {
            error!("Failed to save scan of {}: {e}", record.domain.name);
            unsaved += 1;
        }
    }
    unsaved
}

pub(super) async fn finalize_scan(
    pool: &SqlitePool,
    config: &Config,
    run_id: String,
    records: Vec<ScanRecord>,
    stats: &ProcessingStats,
    start_time: Instant,
) -> Result<ScanReport> {
    let unsaved_records = persist_records(pool, &run_id, &records).await;
    if unsaved_records > 0 {
        warn!("{unsaved_records} scan record(s) could not be saved");
    }

    let snapshot = aggregate(&records);
    insert_statistics_snapshot(pool, Some(&run_id), &snapshot)
        .await
        .context("Failed to store statistics snapshot")?;

    let elapsed_seconds = start_time.elapsed().as_secs_f64();
    let run_stats = RunStats {
        run_id: &run_id,
        total_domains: snapshot.total_scans,
        successful_domains: snapshot.successful_scans,
        failed_domains: snapshot.error_scans,
        elapsed_seconds,
    };
    update_run_stats(pool, &run_stats)
        .await
        .context("Failed to update run statistics")?;

    if let Err(e) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
        .execute(pool)
        .await
    {
        warn!("Failed to checkpoint WAL file (this is non-critical): {e}");
    }

    if let Some(path) = &config.snapshot_out {
        export_snapshot_json(&snapshot, Some(path))?;
        info!("Wrote aggregate snapshot to {}", path.display());
    }
    if let Some(path) = &config.csv_out {
        let rows = export_summaries_csv(&snapshot.scans, Some(path))?;
        info!("Wrote {rows} summary rows to {}", path.display());
    }

    print_error_statistics(stats);
    print_simple_summary(
        snapshot.total_scans,
        snapshot.successful_scans,
        snapshot.error_scans,
        elapsed_seconds,
    );
    debug!(
        "PQC adoption {:.1}%, average score {:.1}",
        snapshot.pqc_adoption_rate, snapshot.avg_score
    );

    Ok(ScanReport {
        total: snapshot.total_scans,
        successful: snapshot.successful_scans,
        failed: snapshot.error_scans,
        unsaved_records,
        db_path: config.db_path.clone(),
        run_id,
        elapsed_seconds,
        snapshot,
    })
}
