//! Scan orchestration.
//!
//! `Orchestrator::run` fans a batch of domains out over a bounded pool of
//! tokio tasks. Each task runs the per-domain pipeline (see `pipeline`) under
//! a deadline. Whatever happens inside a task, every input domain yields
//! exactly one `ScanRecord`, returned in input order.

mod pipeline;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::task::JoinError;

use crate::config::{
    Config, DEFAULT_PQC_TIMEOUT_SECS, DEFAULT_TLS_TIMEOUT_SECS, DNS_TIMEOUT_SECS,
    DOMAIN_DEADLINE_MARGIN_SECS, MAX_TLS_HANDSHAKES, TLS_PORT,
};
use crate::error_handling::{ErrorType, ProcessingStats, ScanError};
use crate::initialization::init_semaphore;
use crate::models::{DomainEntry, ScanRecord};
use crate::probe::{GeoResolver, PqcProbe, TlsProbe};
use crate::security::CaClassifier;

pub use pipeline::certificate_info;

/// Per-domain limits.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub port: u16,
    pub pqc_timeout: Duration,
    /// Deadline for the whole per-domain pipeline
    pub domain_timeout: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from_timeouts(
            Duration::from_secs(DEFAULT_TLS_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_PQC_TIMEOUT_SECS),
        )
    }
}

impl ScanSettings {
    /// Derives the domain deadline from the probe timeouts.
    ///
    /// Every TLS handshake may spend `tls_timeout` connecting and again
    /// negotiating, so the deadline always outlasts a full TLS probe followed
    /// by a PQC probe that runs into its own timeout.
    pub fn from_timeouts(tls_timeout: Duration, pqc_timeout: Duration) -> Self {
        let handshakes = u32::try_from(MAX_TLS_HANDSHAKES * 2).unwrap_or(u32::MAX);
        let tls_budget = tls_timeout.saturating_mul(handshakes);
        let margin = Duration::from_secs(DNS_TIMEOUT_SECS + DOMAIN_DEADLINE_MARGIN_SECS);
        Self {
            port: TLS_PORT,
            pqc_timeout,
            domain_timeout: tls_budget.saturating_add(pqc_timeout).saturating_add(margin),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::from_timeouts(
            Duration::from_secs(config.tls_timeout_seconds),
            Duration::from_secs(config.pqc_timeout_seconds),
        )
    }
}

/// Live counters for progress logging.
#[derive(Debug, Default)]
pub struct ScanProgress {
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl ScanProgress {
    pub(crate) fn start(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
    }

    pub(crate) fn record(&self, record: &ScanRecord) {
        if record.is_success() {
            self.completed.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Domains that produced a graded record.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Domains that produced an `ERROR` record.
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Domains finished either way.
    pub fn scanned(&self) -> usize {
        self.completed() + self.failed()
    }
}

/// Read-only state shared by every scan task.
pub(crate) struct ScanContext<T, P, G> {
    pub(crate) tls: T,
    pub(crate) pqc: P,
    pub(crate) geo: G,
    pub(crate) classifier: CaClassifier,
    pub(crate) settings: ScanSettings,
    pub(crate) stats: Arc<ProcessingStats>,
}

/// Runs the per-domain pipeline across a bounded worker pool.
pub struct Orchestrator<T, P, G> {
    ctx: Arc<ScanContext<T, P, G>>,
    progress: Arc<ScanProgress>,
}

impl<T, P, G> Orchestrator<T, P, G>
where
    T: TlsProbe,
    P: PqcProbe,
    G: GeoResolver,
{
    pub fn new(tls: T, pqc: P, geo: G, settings: ScanSettings) -> Self {
        Self::with_classifier(tls, pqc, geo, settings, CaClassifier::default())
    }

    pub fn with_classifier(
        tls: T,
        pqc: P,
        geo: G,
        settings: ScanSettings,
        classifier: CaClassifier,
    ) -> Self {
        Self {
            ctx: Arc::new(ScanContext {
                tls,
                pqc,
                geo,
                classifier,
                settings,
                stats: Arc::new(ProcessingStats::new()),
            }),
            progress: Arc::new(ScanProgress::default()),
        }
    }

    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    pub fn stats(&self) -> Arc<ProcessingStats> {
        Arc::clone(&self.ctx.stats)
    }

    /// Scans every domain with at most `concurrency` in flight.
    ///
    /// Returns one record per input entry, in input order.
    ///
    /// # Errors
    ///
    /// `ScanError::NoWorkerCapacity` if `concurrency` is zero. Per-domain
    /// failures never surface here; they become `ERROR` records.
    pub async fn run(
        &self,
        domains: Vec<DomainEntry>,
        concurrency: usize,
    ) -> Result<Vec<ScanRecord>, ScanError> {
        if concurrency == 0 {
            return Err(ScanError::NoWorkerCapacity);
        }

        let semaphore = init_semaphore(concurrency);
        self.progress.start(domains.len());
        let mut slots: Vec<Option<ScanRecord>> = vec![None; domains.len()];
        let mut tasks = FuturesUnordered::new();

        for (index, entry) in domains.iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| ScanError::NoWorkerCapacity)?;

            let ctx = Arc::clone(&self.ctx);
            let progress = Arc::clone(&self.progress);
            let task_entry = entry.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                let record = pipeline::scan_with_deadline(task_entry, ctx).await;
                progress.record(&record);
                record
            });

            let entry = entry.clone();
            tasks.push(async move { (index, entry, handle.await) });
        }

        while let Some((index, entry, joined)) = tasks.next().await {
            let record = match joined {
                Ok(record) => record,
                Err(e) => {
                    self.ctx.stats.increment_error(ErrorType::TaskPanicked);
                    let message = describe_join_error(e);
                    log::error!("Scan task for {} terminated: {}", entry.name, message);
                    let record = ScanRecord::error(entry, Utc::now(), message);
                    self.progress.record(&record);
                    record
                }
            };
            slots[index] = Some(record);
        }

        Ok(slots
            .into_iter()
            .zip(domains)
            .map(|(slot, entry)| {
                slot.unwrap_or_else(|| {
                    ScanRecord::error(entry, Utc::now(), "Scan task produced no result")
                })
            })
            .collect())
    }
}

fn describe_join_error(error: JoinError) -> String {
    if !error.is_panic() {
        return format!("Scan task cancelled: {error}");
    }
    let payload = error.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Scan task panicked: {detail}")
}
