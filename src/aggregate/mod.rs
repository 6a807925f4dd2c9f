//! Result aggregation.
//!
//! `aggregate` folds a batch of `ScanRecord`s into an `AggregateSnapshot`:
//! headline counts and rates, frequency distributions and one `ScanSummary`
//! row per record for downstream reporting.
//!
//! `ERROR` records count toward `total_scans`, land in the `"Error"` grade
//! bucket and contribute a score of 0 to `avg_score`. They are left out of
//! every other distribution.

mod issuer;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ERROR_GRADE_LABEL, TOP_CIPHER_COUNT, UNKNOWN_LABEL};
use crate::models::{CaType, ScanRecord, ScanStatus};

pub use issuer::issuer_display_name;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    /// `%Y-%m-%d`, or `"Unknown"`
    pub valid_from: String,
    pub valid_until: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDetails {
    pub error_message: Option<String>,
    pub pqc_algorithms: Vec<String>,
    pub cipher_suites: Vec<String>,
    pub certificate: CertificateSummary,
}

/// One reportable row per scanned domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub domain: String,
    pub rank: u64,
    pub status: ScanStatus,
    /// Letter grade, or `"Error"`
    pub grade: String,
    pub score: f64,
    pub pqc_supported: bool,
    /// Highest supported protocol label
    pub tls_version: String,
    pub ca_type: String,
    pub issuer: String,
    pub country: String,
    /// `%Y-%m-%d %H:%M` (UTC)
    pub date: String,
    /// Unix seconds
    pub timestamp: i64,
    pub details: ScanDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub generated_at: DateTime<Utc>,
    pub total_scans: usize,
    pub successful_scans: usize,
    pub error_scans: usize,
    pub pqc_count: usize,
    pub commercial_ca_count: usize,
    pub pqc_adoption_rate: f64,
    pub commercial_ca_rate: f64,
    pub avg_score: f64,
    pub grade_distribution: BTreeMap<String, usize>,
    pub tls_distribution: BTreeMap<String, usize>,
    /// The `TOP_CIPHER_COUNT` most frequent cipher names
    pub cipher_distribution: BTreeMap<String, usize>,
    pub ca_distribution: BTreeMap<String, usize>,
    pub pqc_algo_distribution: BTreeMap<String, usize>,
    pub geo_distribution: BTreeMap<String, usize>,
    /// Newest first
    pub scans: Vec<ScanSummary>,
}

/// Builds the snapshot. An empty batch yields zero counts and rates.
pub fn aggregate(records: &[ScanRecord]) -> AggregateSnapshot {
    let total_scans = records.len();
    let mut successful_scans = 0;
    let mut pqc_count = 0;
    let mut commercial_ca_count = 0;
    let mut total_score = 0.0;

    let mut grade_distribution = BTreeMap::new();
    let mut tls_distribution = BTreeMap::new();
    let mut cipher_counts: HashMap<&str, usize> = HashMap::new();
    let mut ca_distribution = BTreeMap::new();
    let mut pqc_algo_distribution = BTreeMap::new();
    let mut geo_distribution = BTreeMap::new();
    let mut scans = Vec::with_capacity(total_scans);

    for record in records {
        let summary = summarize(record);
        *grade_distribution.entry(summary.grade.clone()).or_insert(0) += 1;
        total_score += summary.score;

        if record.is_success() {
            successful_scans += 1;
            if summary.pqc_supported {
                pqc_count += 1;
            }
            if record
                .certificate
                .as_ref()
                .is_some_and(|c| c.ca_type == CaType::CommercialCa)
            {
                commercial_ca_count += 1;
            }

            *tls_distribution.entry(summary.tls_version.clone()).or_insert(0) += 1;
            *ca_distribution.entry(summary.issuer.clone()).or_insert(0) += 1;
            *geo_distribution.entry(summary.country.clone()).or_insert(0) += 1;
            for cipher in &record.ciphers {
                *cipher_counts.entry(cipher.name.as_str()).or_insert(0) += 1;
            }
            if let Some(pqc) = record.pqc.as_ref().filter(|p| p.supported) {
                for suite in &pqc.supported_suites {
                    *pqc_algo_distribution.entry(suite.clone()).or_insert(0) += 1;
                }
            }
        }

        scans.push(summary);
    }

    scans.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    AggregateSnapshot {
        generated_at: Utc::now(),
        total_scans,
        successful_scans,
        error_scans: total_scans - successful_scans,
        pqc_count,
        commercial_ca_count,
        pqc_adoption_rate: percentage(pqc_count, total_scans),
        commercial_ca_rate: percentage(commercial_ca_count, total_scans),
        avg_score: if total_scans == 0 {
            0.0
        } else {
            round1(total_score / total_scans as f64)
        },
        grade_distribution,
        tls_distribution,
        cipher_distribution: top_n(cipher_counts, TOP_CIPHER_COUNT),
        ca_distribution,
        pqc_algo_distribution,
        geo_distribution,
        scans,
    }
}

/// Reportable row for one record.
pub fn summarize(record: &ScanRecord) -> ScanSummary {
    let is_success = record.is_success();
    let unknown = || UNKNOWN_LABEL.to_string();

    let grade = match (record.status, record.grade) {
        (ScanStatus::Success, Some(grade)) => grade.to_string(),
        (ScanStatus::Success, None) => unknown(),
        (ScanStatus::Error, _) => ERROR_GRADE_LABEL.to_string(),
    };
    let score = if is_success {
        record.score.unwrap_or(0.0)
    } else {
        0.0
    };

    let tls_version = record
        .supported_versions()
        .map(|v| v.as_str())
        .max()
        .map(str::to_string)
        .unwrap_or_else(unknown);

    let (ca_type, issuer, certificate) = match &record.certificate {
        Some(cert) => (
            cert.ca_type.to_string(),
            issuer_display_name(&cert.issuer),
            CertificateSummary {
                subject: cert.subject.clone(),
                issuer: cert.issuer.clone(),
                valid_from: cert.valid_from.format("%Y-%m-%d").to_string(),
                valid_until: cert.valid_until.format("%Y-%m-%d").to_string(),
            },
        ),
        None => (
            unknown(),
            unknown(),
            CertificateSummary {
                subject: unknown(),
                issuer: unknown(),
                valid_from: unknown(),
                valid_until: unknown(),
            },
        ),
    };

    let country = record
        .geo
        .as_ref()
        .map(|g| g.country_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(unknown);

    let pqc_algorithms: Vec<String> = record
        .pqc
        .as_ref()
        .map(|p| p.supported_suites.iter().cloned().collect())
        .unwrap_or_default();

    ScanSummary {
        domain: record.domain.name.clone(),
        rank: record.domain.rank,
        status: record.status,
        grade,
        score: round1(score),
        pqc_supported: record.pqc_supported(),
        tls_version,
        ca_type,
        issuer,
        country,
        date: record.scan_timestamp.format("%Y-%m-%d %H:%M").to_string(),
        timestamp: record.scan_timestamp.timestamp(),
        details: ScanDetails {
            error_message: record.error_message.clone(),
            pqc_algorithms,
            cipher_suites: record.ciphers.iter().map(|c| c.name.clone()).collect(),
            certificate,
        },
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(count as f64 / total as f64 * 100.0)
}

/// Highest counts first; equal counts are broken by name.
fn top_n(counts: HashMap<&str, usize>, n: usize) -> BTreeMap<String, usize> {
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
