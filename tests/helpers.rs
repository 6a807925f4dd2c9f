// Shared test helpers: stub probes, input files and configs.
//
// Each integration test file pulls this in with `mod helpers;`, so not every
// helper is used everywhere.
#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::NamedTempFile;

use pqc_scanner::error_handling::{GeoError, PqcProbeError, TlsProbeError};
use pqc_scanner::models::{GeoLocation, TlsVersion};
use pqc_scanner::probe::{
    GeoResolver, LeafCertificate, PqcProbe, PqcProbeOutput, ProtocolProbe, TlsProbe,
    TlsProbeReport,
};
use pqc_scanner::{Config, LogFormat, LogLevel};

/// Header of the Majestic Million CSV.
pub const MAJESTIC_HEADER: &str =
    "GlobalRank,TldRank,Domain,TLD,RefSubNets,RefIPs,IDN_Domain,IDN_TLD,PrevGlobalRank,PrevTldRank,PrevRefSubNets,PrevRefIPs";

/// Writes a Majestic-style CSV with one row per `(rank, domain, tld)`.
pub fn write_domains_csv(rows: &[(u64, &str, &str)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "{MAJESTIC_HEADER}").expect("Failed to write header");
    for (rank, domain, tld) in rows {
        writeln!(file, "{rank},{rank},{domain},{tld},100,100,{domain},{tld},{rank},{rank},100,100")
            .expect("Failed to write row");
    }
    file.flush().expect("Failed to flush file");
    file
}

/// Config pointing at `input` and `db_path`, with the external tools disabled.
pub fn test_config(input: PathBuf, db_path: PathBuf) -> Config {
    Config {
        file: input,
        log_level: LogLevel::Error,
        log_format: LogFormat::Plain,
        db_path,
        max_concurrency: 4,
        tls_timeout_seconds: 1,
        pqc_timeout_seconds: 1,
        pqcscan_path: PathBuf::from("/nonexistent/pqcscan"),
        geoip: PathBuf::from("/nonexistent/GeoLite2-City.mmdb"),
        ..Default::default()
    }
}

pub fn leaf(issuer: &str) -> LeafCertificate {
    LeafCertificate {
        der: vec![0x30, 0x00],
        pem: None,
        issuer: issuer.to_string(),
        subject: "CN=example.com".to_string(),
        signature_algorithm: Some("sha256WithRSAEncryption".to_string()),
        public_key_algorithm: Some("RSA".to_string()),
        public_key_size: Some(2048),
        valid_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        valid_until: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// TLS stub: domains in `failing` are refused; `legacy` get TLS 1.0 only
/// under a commercial CA; everything else gets TLS 1.2 + 1.3 under a free CA.
#[derive(Default)]
pub struct StubTls {
    pub failing: HashSet<String>,
    pub legacy: HashSet<String>,
}

impl StubTls {
    pub fn failing(mut self, domain: &str) -> Self {
        self.failing.insert(domain.to_string());
        self
    }

    pub fn legacy(mut self, domain: &str) -> Self {
        self.legacy.insert(domain.to_string());
        self
    }
}

impl TlsProbe for StubTls {
    async fn probe(&self, domain: &str, _port: u16) -> Result<TlsProbeReport, TlsProbeError> {
        if self.failing.contains(domain) {
            return Err(TlsProbeError::ConnectFailed(format!(
                "{domain}:443: Connection refused"
            )));
        }
        if self.legacy.contains(domain) {
            return Ok(TlsProbeReport {
                protocols: vec![ProtocolProbe::supported(
                    TlsVersion::Tls10,
                    vec!["TLS_RSA_WITH_3DES_EDE_CBC_SHA".to_string()],
                )],
                certificate: Some(leaf("C=US, O=DigiCert Inc, CN=DigiCert Global G2")),
            });
        }
        Ok(TlsProbeReport {
            protocols: vec![
                ProtocolProbe::supported(
                    TlsVersion::Tls12,
                    vec!["TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384".to_string()],
                ),
                ProtocolProbe::supported(
                    TlsVersion::Tls13,
                    vec!["TLS13_AES_256_GCM_SHA384".to_string()],
                ),
            ],
            certificate: Some(leaf("C=US, O=Let's Encrypt, CN=R10")),
        })
    }
}

/// PQC stub reporting X25519MLKEM768 for targets listed in `supported`.
#[derive(Default)]
pub struct StubPqc {
    pub supported: HashSet<String>,
}

impl StubPqc {
    pub fn supporting(domains: &[&str]) -> Self {
        Self {
            supported: domains.iter().map(|d| format!("{d}:443")).collect(),
        }
    }
}

impl PqcProbe for StubPqc {
    async fn probe(
        &self,
        target: &str,
        _timeout: Duration,
    ) -> Result<PqcProbeOutput, PqcProbeError> {
        if self.supported.contains(target) {
            Ok(PqcProbeOutput {
                pqc_supported: true,
                hybrid_algorithms: vec!["X25519MLKEM768".to_string()],
                non_pqc_algorithms: vec!["X25519".to_string()],
                ..Default::default()
            })
        } else {
            Ok(PqcProbeOutput {
                non_pqc_algorithms: vec!["X25519".to_string()],
                ..Default::default()
            })
        }
    }
}

/// Locates every domain in the same place.
pub struct StubGeo;

impl GeoResolver for StubGeo {
    async fn resolve(&self, _domain: &str) -> Result<Option<GeoLocation>, GeoError> {
        Ok(Some(GeoLocation {
            ip_address: "198.51.100.7".to_string(),
            country_code: "DE".to_string(),
            country_name: "Germany".to_string(),
            region: Some("Hesse".to_string()),
            city: Some("Frankfurt am Main".to_string()),
            latitude: 50.1155,
            longitude: 8.6842,
        }))
    }
}
