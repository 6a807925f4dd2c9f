//! Batch entry point.
//!
//! `run_scan` loads the domain list, scans it, aggregates the results, writes
//! them to SQLite and produces the configured exports.

mod finalize;
mod resources;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::aggregate::AggregateSnapshot;
use crate::app::{log_progress, shutdown_gracefully, spawn_progress_logger};
use crate::config::{Config, LOGGING_INTERVAL};
use crate::domain::DomainLoader;
use crate::initialization::init_crypto_provider;
use crate::models::DomainEntry;
use crate::probe::{GeoResolver, PqcProbe, TlsProbe};
use crate::scan::{Orchestrator, ScanSettings};
use crate::storage::{init_db_pool_with_path, insert_run_metadata, run_migrations, RunMetadata};

pub use resources::{init_probes, GeoBackend, PqcBackend, ScanProbes};

/// Outcome of a batch run.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub run_id: String,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Records that could not be written to the database
    pub unsaved_records: usize,
    pub db_path: PathBuf,
    pub elapsed_seconds: f64,
    pub snapshot: AggregateSnapshot,
}

/// Runs a full scan with the probes selected from `config`.
pub async fn run_scan(config: Config) -> Result<ScanReport> {
    init_crypto_provider();
    let ScanProbes { tls, pqc, geo } = init_probes(&config).await;
    run_scan_with(config, tls, pqc, geo).await
}

/// Runs a full scan with caller-provided probes.
pub async fn run_scan_with<T, P, G>(config: Config, tls: T, pqc: P, geo: G) -> Result<ScanReport>
where
    T: TlsProbe,
    P: PqcProbe,
    G: GeoResolver,
{
    config
        .validate()
        .context("Configuration validation failed")?;
    let start_time = Instant::now();

    let domains = load_domains(&config)?;
    info!(
        "Loaded {} domains from {}",
        domains.len(),
        config.file.display()
    );

    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let start_time_ms = Utc::now().timestamp_millis();
    let run_id = new_run_id(start_time_ms);
    let input_file = config.file.to_string_lossy();
    insert_run_metadata(
        &pool,
        &RunMetadata {
            run_id: &run_id,
            start_time_ms,
            version: env!("CARGO_PKG_VERSION"),
            input_file: Some(&*input_file),
            max_concurrency: config.max_concurrency,
        },
    )
    .await
    .context("Failed to insert run metadata")?;
    info!("Starting {run_id} with {} workers", config.max_concurrency);

    let orchestrator = Orchestrator::new(tls, pqc, geo, ScanSettings::from_config(&config));
    let progress = orchestrator.progress();
    let cancel = CancellationToken::new();
    let logging_task = spawn_progress_logger(
        progress.clone(),
        Duration::from_secs(LOGGING_INTERVAL),
        cancel.clone(),
    );

    let scanned = orchestrator.run(domains, config.max_concurrency).await;
    shutdown_gracefully(cancel, Some(logging_task)).await;
    log_progress(start_time, &progress);
    let records = scanned.context("Scan could not start")?;

    let stats = orchestrator.stats();
    let report =
        finalize::finalize_scan(&pool, &config, run_id, records, &stats, start_time).await;
    pool.close().await;
    report
}

fn load_domains(config: &Config) -> Result<Vec<DomainEntry>> {
    let domains = match (config.sample, config.limit) {
        (true, Some(size)) => DomainLoader::load_sampled_from_path(&config.file, size),
        _ => DomainLoader::load_from_path(&config.file, config.limit),
    };
    domains.with_context(|| format!("Failed to load domains from {}", config.file.display()))
}

/// `run_<millis>_<8 hex digits>`; runs started in the same millisecond get
/// distinct ids.
fn new_run_id(start_time_ms: i64) -> String {
    format!("run_{start_time_ms}_{:08x}", rand::random::<u32>())
}
