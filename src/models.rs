//! Scan data model.
//!
//! These are the records produced by the orchestrator and consumed by the
//! aggregator, the storage layer, and the exporters. Probe adapters convert
//! their own output into these types at the boundary (see `crate::probe`).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter as EnumIterMacro;

/// A ranked domain loaded from the input list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainEntry {
    /// Global rank from the source list
    pub rank: u64,
    /// Fully-qualified domain name
    pub name: String,
    /// Top-level domain as reported by the source list
    pub tld: String,
}

impl DomainEntry {
    pub fn new(rank: u64, name: impl Into<String>, tld: impl Into<String>) -> Self {
        Self {
            rank,
            name: name.into(),
            tld: tld.into(),
        }
    }
}

/// SSL/TLS protocol versions probed for every domain.
///
/// Labels sort lexicographically in protocol order ("SSL 2.0" < ... < "TLS 1.3"),
/// which the aggregator relies on when picking the highest supported version.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIterMacro,
)]
pub enum TlsVersion {
    #[serde(rename = "SSL 2.0")]
    Ssl2,
    #[serde(rename = "SSL 3.0")]
    Ssl3,
    #[serde(rename = "TLS 1.0")]
    Tls10,
    #[serde(rename = "TLS 1.1")]
    Tls11,
    #[serde(rename = "TLS 1.2")]
    Tls12,
    #[serde(rename = "TLS 1.3")]
    Tls13,
}

impl TlsVersion {
    /// Every probed version, oldest first.
    pub const ALL: [TlsVersion; 6] = [
        TlsVersion::Ssl2,
        TlsVersion::Ssl3,
        TlsVersion::Tls10,
        TlsVersion::Tls11,
        TlsVersion::Tls12,
        TlsVersion::Tls13,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TlsVersion::Ssl2 => "SSL 2.0",
            TlsVersion::Ssl3 => "SSL 3.0",
            TlsVersion::Tls10 => "TLS 1.0",
            TlsVersion::Tls11 => "TLS 1.1",
            TlsVersion::Tls12 => "TLS 1.2",
            TlsVersion::Tls13 => "TLS 1.3",
        }
    }

    /// SSL 2.0 through TLS 1.1.
    pub fn is_deprecated(&self) -> bool {
        matches!(
            self,
            TlsVersion::Ssl2 | TlsVersion::Ssl3 | TlsVersion::Tls10 | TlsVersion::Tls11
        )
    }
}

impl std::fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a single protocol version was accepted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsVersionObservation {
    pub version: TlsVersion,
    pub supported: bool,
}

/// A cipher suite accepted by the server for a given protocol version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherObservation {
    pub name: String,
    pub tls_version: String,
    pub is_weak: bool,
    pub is_forward_secret: bool,
}

/// Classification of the certificate issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaType {
    #[serde(rename = "FREE_CA")]
    FreeCa,
    #[serde(rename = "COMMERCIAL_CA")]
    CommercialCa,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl CaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaType::FreeCa => "FREE_CA",
            CaType::CommercialCa => "COMMERCIAL_CA",
            CaType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for CaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf certificate details with its issuer classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub issuer: String,
    pub subject: String,
    pub signature_algorithm: String,
    pub public_key_algorithm: String,
    pub public_key_size: u32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub ca_type: CaType,
    pub pem: String,
}

/// Post-quantum key exchange support.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PqcInfo {
    pub supported: bool,
    pub supports_mlkem512: bool,
    pub supports_mlkem768: bool,
    pub supports_mlkem1024: bool,
    /// Hybrid and PQC-only groups offered by the server
    pub supported_suites: BTreeSet<String>,
    /// Hybrid (classical + PQC) groups only
    pub hybrid_combinations: BTreeSet<String>,
    /// Probe failure reason; diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PqcInfo {
    /// PQC reported as unsupported, optionally recording why the probe failed.
    pub fn unsupported(error: Option<String>) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }
}

/// Geographic location of the domain's resolved address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub ip_address: String,
    pub country_code: String,
    pub country_name: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "ERROR")]
    Error,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Success => "SUCCESS",
            ScanStatus::Error => "ERROR",
        }
    }
}

/// Letter grade summarising a domain's TLS posture.
///
/// - `S`: TLS 1.3 with PQC key exchange and no weak ciphers
/// - `A`: TLS 1.2/1.3 with strong ciphers
/// - `B`: TLS 1.2 with some weak ciphers
/// - `F`: deprecated protocols or nothing usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIterMacro)]
pub enum Grade {
    S,
    A,
    B,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scan of one domain.
///
/// `grade` and `score` are present iff `status == ScanStatus::Success`.
/// Records are never mutated after the orchestrator emits them; rescanning a
/// domain produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub domain: DomainEntry,
    pub scan_timestamp: DateTime<Utc>,
    pub status: ScanStatus,
    pub error_message: Option<String>,
    pub tls_versions: Vec<TlsVersionObservation>,
    pub ciphers: Vec<CipherObservation>,
    pub certificate: Option<CertificateInfo>,
    pub pqc: Option<PqcInfo>,
    pub geo: Option<GeoLocation>,
    pub grade: Option<Grade>,
    pub score: Option<f64>,
}

impl ScanRecord {
    /// Builds an `ERROR` record carrying `message`.
    pub fn error(
        domain: DomainEntry,
        scan_timestamp: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            domain,
            scan_timestamp,
            status: ScanStatus::Error,
            error_message: Some(message.into()),
            tls_versions: Vec::new(),
            ciphers: Vec::new(),
            certificate: None,
            pqc: None,
            geo: None,
            grade: None,
            score: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ScanStatus::Success
    }

    /// Supported protocol versions, oldest first.
    pub fn supported_versions(&self) -> impl Iterator<Item = TlsVersion> + '_ {
        self.tls_versions
            .iter()
            .filter(|v| v.supported)
            .map(|v| v.version)
    }

    pub fn pqc_supported(&self) -> bool {
        self.pqc.as_ref().map(|p| p.supported).unwrap_or(false)
    }
}
