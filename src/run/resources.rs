//! Probe selection for a batch run.
//!
//! The PQC tool and the GeoIP database are optional at runtime. The backend
//! enums let the orchestrator stay monomorphic whichever is available.

use std::time::Duration;

use log::{info, warn};

use crate::config::Config;
use crate::error_handling::{GeoError, PqcProbeError};
use crate::geoip::{DisabledGeoResolver, MaxMindGeoResolver};
use crate::initialization::init_resolver;
use crate::models::GeoLocation;
use crate::probe::{
    DisabledPqcProbe, GeoResolver, PqcProbe, PqcProbeOutput, PqcscanProbe, RustlsTlsProbe,
};

/// `pqcscan` when installed, otherwise a probe that reports it unavailable.
pub enum PqcBackend {
    Pqcscan(PqcscanProbe),
    Disabled(DisabledPqcProbe),
}

impl PqcProbe for PqcBackend {
    async fn probe(
        &self,
        target: &str,
        timeout: Duration,
    ) -> Result<PqcProbeOutput, PqcProbeError> {
        match self {
            PqcBackend::Pqcscan(probe) => probe.probe(target, timeout).await,
            PqcBackend::Disabled(probe) => probe.probe(target, timeout).await,
        }
    }
}

/// MaxMind lookup when a database could be opened, otherwise no geolocation.
pub enum GeoBackend {
    MaxMind(MaxMindGeoResolver),
    Disabled(DisabledGeoResolver),
}

impl GeoResolver for GeoBackend {
    async fn resolve(&self, domain: &str) -> Result<Option<GeoLocation>, GeoError> {
        match self {
            GeoBackend::MaxMind(resolver) => resolver.resolve(domain).await,
            GeoBackend::Disabled(resolver) => resolver.resolve(domain).await,
        }
    }
}

/// The three probes used by a run.
pub struct ScanProbes {
    pub tls: RustlsTlsProbe,
    pub pqc: PqcBackend,
    pub geo: GeoBackend,
}

/// Builds the probes described by `config`.
///
/// A missing `pqcscan` binary or GeoIP database disables that stage with a
/// warning instead of failing the run.
pub async fn init_probes(config: &Config) -> ScanProbes {
    let tls = RustlsTlsProbe::new(Duration::from_secs(config.tls_timeout_seconds));

    let pqc = if config.pqcscan_path.exists() {
        info!("PQC probing with {}", config.pqcscan_path.display());
        PqcBackend::Pqcscan(PqcscanProbe::new(&config.pqcscan_path))
    } else {
        warn!(
            "pqcscan not found at {}; PQC support will be reported as unavailable",
            config.pqcscan_path.display()
        );
        PqcBackend::Disabled(DisabledPqcProbe)
    };

    let geo = if config.geoip.exists() {
        match MaxMindGeoResolver::open(&config.geoip, init_resolver()).await {
            Ok(resolver) => GeoBackend::MaxMind(resolver),
            Err(e) => {
                warn!("{e}; GeoIP lookup disabled");
                GeoBackend::Disabled(DisabledGeoResolver)
            }
        }
    } else {
        info!(
            "GeoIP database not found at {}; GeoIP lookup disabled",
            config.geoip.display()
        );
        GeoBackend::Disabled(DisabledGeoResolver)
    };

    ScanProbes { tls, pqc, geo }
}
