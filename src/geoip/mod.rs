//! GeoIP adapter.
//!
//! Resolves a domain with hickory and looks the first address up in a MaxMind
//! GeoLite2-City database. A missing database disables geolocation rather than
//! failing the run.

mod lookup;

use std::path::Path;
use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use maxminddb::Reader;

use crate::error_handling::{GeoError, InitializationError};
use crate::models::GeoLocation;
use crate::probe::GeoResolver;

pub use lookup::lookup_city;

/// Geolocation through DNS and a MaxMind City database held in memory.
pub struct MaxMindGeoResolver {
    reader: Arc<Reader<Vec<u8>>>,
    resolver: Arc<TokioAsyncResolver>,
}

impl MaxMindGeoResolver {
    pub fn new(reader: Reader<Vec<u8>>, resolver: Arc<TokioAsyncResolver>) -> Self {
        Self {
            reader: Arc::new(reader),
            resolver,
        }
    }

    /// Reads the database at `path` into memory.
    pub async fn open(
        path: &Path,
        resolver: Arc<TokioAsyncResolver>,
    ) -> Result<Self, InitializationError> {
        log::info!("Loading GeoIP database from: {}", path.display());
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            InitializationError::GeoIpError(format!(
                "Failed to read GeoIP database from {}: {e}",
                path.display()
            ))
        })?;
        let reader = Reader::from_source(bytes).map_err(|e| {
            InitializationError::GeoIpError(format!(
                "Failed to parse GeoIP database from {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::new(reader, resolver))
    }
}

impl GeoResolver for MaxMindGeoResolver {
    async fn resolve(&self, domain: &str) -> Result<Option<GeoLocation>, GeoError> {
        let ip = self
            .resolver
            .lookup_ip(domain)
            .await
            .ok()
            .and_then(|answer| answer.iter().next())
            .ok_or_else(|| GeoError::Resolution(domain.to_string()))?;

        lookup_city(&self.reader, ip)
    }
}

/// Stand-in used when no GeoIP database is configured. Always reports no data.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeoResolver;

impl GeoResolver for DisabledGeoResolver {
    async fn resolve(&self, _domain: &str) -> Result<Option<GeoLocation>, GeoError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_resolver_returns_none() {
        assert_eq!(DisabledGeoResolver.resolve("example.com").await, Ok(None));
    }

    #[tokio::test]
    async fn test_open_missing_database() {
        let resolver = crate::initialization::init_resolver();
        let result = MaxMindGeoResolver::open(Path::new("/nonexistent/City.mmdb"), resolver).await;
        assert!(matches!(result, Err(InitializationError::GeoIpError(_))));
    }

    #[tokio::test]
    async fn test_open_rejects_non_mmdb_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a maxmind database").unwrap();
        let resolver = crate::initialization::init_resolver();
        let result = MaxMindGeoResolver::open(file.path(), resolver).await;
        assert!(matches!(result, Err(InitializationError::GeoIpError(_))));
    }
}
