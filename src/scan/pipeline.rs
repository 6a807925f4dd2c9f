//! The per-domain pipeline: TLS -> certificate -> PQC -> geo -> grade.

use std::sync::Arc;

use chrono::Utc;

use super::ScanContext;
use crate::error_handling::{ErrorType, PqcProbeError, WarningType};
use crate::models::{
    CertificateInfo, CipherObservation, DomainEntry, PqcInfo, ScanRecord, ScanStatus,
    TlsVersion, TlsVersionObservation,
};
use crate::probe::{der_to_pem, GeoResolver, LeafCertificate, PqcProbe, TlsProbe, TlsProbeReport};
use crate::security::{grade, is_forward_secret, is_weak_cipher, CaClassifier, GradingFacts};

/// Runs `scan_domain` under the configured per-domain deadline.
pub(super) async fn scan_with_deadline<T, P, G>(
    entry: DomainEntry,
    ctx: Arc<ScanContext<T, P, G>>,
) -> ScanRecord
where
    T: TlsProbe,
    P: PqcProbe,
    G: GeoResolver,
{
    let started = Utc::now();
    let deadline = ctx.settings.domain_timeout;
    match tokio::time::timeout(deadline, scan_domain(entry.clone(), &ctx)).await {
        Ok(record) => record,
        Err(_) => {
            ctx.stats.increment_error(ErrorType::ScanTimeout);
            log::warn!("Timeout scanning {}", entry.name);
            ScanRecord::error(
                entry,
                started,
                format!("Scan timeout after {deadline:?}"),
            )
        }
    }
}

async fn scan_domain<T, P, G>(entry: DomainEntry, ctx: &ScanContext<T, P, G>) -> ScanRecord
where
    T: TlsProbe,
    P: PqcProbe,
    G: GeoResolver,
{
    let scan_timestamp = Utc::now();
    let port = ctx.settings.port;

    log::debug!("TLS probe for {}", entry.name);
    let report = match ctx.tls.probe(&entry.name, port).await {
        Ok(report) => report,
        Err(e) => {
            ctx.stats.increment_error(e.error_type());
            log::warn!("TLS probe failed for {}: {}", entry.name, e);
            return ScanRecord::error(entry, scan_timestamp, e.to_string());
        }
    };

    let tls_versions = version_observations(&report);
    let ciphers = cipher_observations(&report);

    let certificate = report
        .certificate
        .map(|leaf| certificate_info(leaf, &ctx.classifier));
    if certificate.is_none() {
        ctx.stats.increment_warning(WarningType::MissingCertificate);
    }

    log::debug!("PQC probe for {}", entry.name);
    let target = format!("{}:{}", entry.name, port);
    let pqc_timeout = ctx.settings.pqc_timeout;
    let pqc = match tokio::time::timeout(pqc_timeout, ctx.pqc.probe(&target, pqc_timeout)).await {
        Ok(Ok(output)) => output.into_pqc_info(),
        Ok(Err(e)) => degraded_pqc(ctx, &entry.name, e),
        Err(_) => degraded_pqc(ctx, &entry.name, PqcProbeError::Timeout),
    };

    let geo = match ctx.geo.resolve(&entry.name).await {
        Ok(Some(location)) => Some(location),
        Ok(None) => {
            ctx.stats.increment_warning(WarningType::MissingGeoLocation);
            None
        }
        Err(e) => {
            ctx.stats.increment_warning(WarningType::GeoLookupFailed);
            log::debug!("Geolocation failed for {}: {}", entry.name, e);
            None
        }
    };

    let facts = GradingFacts::from_parts(
        tls_versions.iter().filter(|v| v.supported).map(|v| v.version),
        &ciphers,
        pqc.supported,
    );
    let (grade, score) = grade(&facts);
    log::debug!("{} graded {} ({:.1})", entry.name, grade, score);

    ScanRecord {
        domain: entry,
        scan_timestamp,
        status: ScanStatus::Success,
        error_message: None,
        tls_versions,
        ciphers,
        certificate,
        pqc: Some(pqc),
        geo,
        grade: Some(grade),
        score: Some(score),
    }
}

fn degraded_pqc<T, P, G>(ctx: &ScanContext<T, P, G>, domain: &str, error: PqcProbeError) -> PqcInfo {
    ctx.stats.increment_warning(error.warning_type());
    match &error {
        // Expected for every domain when the tool is not installed
        PqcProbeError::Unavailable(_) => log::debug!("PQC probe skipped for {domain}: {error}"),
        _ => log::warn!("PQC probe failed for {domain}: {error}"),
    }
    PqcInfo::unsupported(Some(error.to_string()))
}

/// One observation per protocol version, in protocol order.
fn version_observations(report: &TlsProbeReport) -> Vec<TlsVersionObservation> {
    TlsVersion::ALL
        .into_iter()
        .map(|version| TlsVersionObservation {
            version,
            supported: report.is_supported(version),
        })
        .collect()
}

fn cipher_observations(report: &TlsProbeReport) -> Vec<CipherObservation> {
    report
        .protocols
        .iter()
        .filter(|p| p.supported)
        .flat_map(|p| {
            p.accepted_ciphers.iter().map(move |name| CipherObservation {
                name: name.clone(),
                tls_version: p.version.as_str().to_string(),
                is_weak: is_weak_cipher(name),
                is_forward_secret: is_forward_secret(name, p.version),
            })
        })
        .collect()
}

/// Converts a probe certificate into the record shape and classifies its issuer.
pub fn certificate_info(leaf: LeafCertificate, classifier: &CaClassifier) -> CertificateInfo {
    let ca_type = classifier.classify(&leaf.issuer);
    let pem = leaf.pem.unwrap_or_else(|| der_to_pem(&leaf.der));
    CertificateInfo {
        ca_type,
        issuer: leaf.issuer,
        subject: leaf.subject,
        signature_algorithm: leaf
            .signature_algorithm
            .unwrap_or_else(|| crate::config::UNKNOWN_LABEL.to_string()),
        public_key_algorithm: leaf
            .public_key_algorithm
            .unwrap_or_else(|| crate::config::UNKNOWN_LABEL.to_string()),
        public_key_size: leaf.public_key_size.unwrap_or(0),
        valid_from: leaf.valid_from,
        valid_until: leaf.valid_until,
        pem,
    }
}
