//! External probe contracts and their adapters.
//!
//! The orchestrator depends only on the three traits below. Adapter output is
//! converted into the strict data model (`crate::models`) by the orchestrator,
//! so a change in an external tool's format stays inside its adapter.
//!
//! Adapters:
//! - `RustlsTlsProbe`: handshakes with rustls, one cipher suite at a time
//! - `PqcscanProbe`: runs the external `pqcscan` tool as a child process
//! - `MaxMindGeoResolver` (in `crate::geoip`): DNS + GeoLite2-City lookup

mod pqc;
mod tls;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error_handling::{GeoError, PqcProbeError, TlsProbeError};
use crate::models::{GeoLocation, PqcInfo, TlsVersion};

pub use pqc::{parse_pqcscan_report, DisabledPqcProbe, PqcscanProbe};
pub use tls::{der_to_pem, RustlsTlsProbe};

/// Performs handshakes against `domain:port` and reports what was accepted.
pub trait TlsProbe: Send + Sync + 'static {
    fn probe(
        &self,
        domain: &str,
        port: u16,
    ) -> impl Future<Output = Result<TlsProbeReport, TlsProbeError>> + Send;
}

/// Reports post-quantum key-exchange groups offered at `target` (`host:port`).
///
/// Implementations should stop within `timeout`; the orchestrator enforces it
/// regardless.
pub trait PqcProbe: Send + Sync + 'static {
    fn probe(
        &self,
        target: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<PqcProbeOutput, PqcProbeError>> + Send;
}

/// Resolves a domain to a geographic location. `Ok(None)` means no data.
pub trait GeoResolver: Send + Sync + 'static {
    fn resolve(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Option<GeoLocation>, GeoError>> + Send;
}

/// Outcome of one protocol version.
///
/// Versions missing from `TlsProbeReport::protocols` are treated as not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolProbe {
    pub version: TlsVersion,
    pub supported: bool,
    /// Cipher suite names accepted under this version
    pub accepted_ciphers: Vec<String>,
}

impl ProtocolProbe {
    pub fn supported(version: TlsVersion, accepted_ciphers: Vec<String>) -> Self {
        Self {
            version,
            supported: true,
            accepted_ciphers,
        }
    }

    pub fn unsupported(version: TlsVersion) -> Self {
        Self {
            version,
            supported: false,
            accepted_ciphers: Vec::new(),
        }
    }
}

/// The leaf certificate as seen by the TLS probe.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafCertificate {
    pub der: Vec<u8>,
    /// PEM encoding; derived from `der` when absent
    pub pem: Option<String>,
    pub issuer: String,
    pub subject: String,
    pub signature_algorithm: Option<String>,
    pub public_key_algorithm: Option<String>,
    /// Key size in bits
    pub public_key_size: Option<u32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TlsProbeReport {
    pub protocols: Vec<ProtocolProbe>,
    pub certificate: Option<LeafCertificate>,
}

impl TlsProbeReport {
    /// Support flag for `version`; false when it was not probed.
    pub fn is_supported(&self, version: TlsVersion) -> bool {
        self.protocols
            .iter()
            .any(|p| p.version == version && p.supported)
    }
}

/// Key-exchange groups reported by a PQC probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PqcProbeOutput {
    pub pqc_supported: bool,
    pub hybrid_algorithms: Vec<String>,
    pub pqc_only_algorithms: Vec<String>,
    pub non_pqc_algorithms: Vec<String>,
    pub error: Option<String>,
}

impl PqcProbeOutput {
    /// Converts into the record shape.
    ///
    /// `supported_suites` is the union of hybrid and PQC-only groups. The
    /// ML-KEM parameter flags are set when any of those names carries the
    /// parameter set size (`512`, `768`, `1024`).
    pub fn into_pqc_info(self) -> PqcInfo {
        let hybrid: std::collections::BTreeSet<String> =
            self.hybrid_algorithms.into_iter().collect();
        let mut all = hybrid.clone();
        all.extend(self.pqc_only_algorithms);

        let mentions = |size: &str| all.iter().any(|a| a.contains(size));

        PqcInfo {
            supported: self.pqc_supported,
            supports_mlkem512: mentions("512"),
            supports_mlkem768: mentions("768"),
            supports_mlkem1024: mentions("1024"),
            supported_suites: all,
            hybrid_combinations: hybrid,
            error: self.error,
        }
    }
}
