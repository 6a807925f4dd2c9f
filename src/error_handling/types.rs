//! Error type definitions.
//!
//! This module defines the typed errors at each boundary of the scanner and the
//! error/warning categories counted by `ProcessingStats`.

use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error opening or reading the GeoIP database.
    #[error("GeoIP initialization error: {0}")]
    GeoIpError(String),
}

/// Error types for database operations.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// JSON encoding of a stored column failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Invalid configuration values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    #[error("Invalid timeout: {0} must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}

/// Failures reading the domain list.
///
/// Only source-level failures surface here; malformed rows are skipped.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Domain list not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read domain list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse domain list: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures of the orchestrator itself (never per-domain).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    #[error("No worker capacity: concurrency must be at least 1")]
    NoWorkerCapacity,
}

/// TLS probe failures. Any of these makes the domain an `ERROR` record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TlsProbeError {
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("TCP connection timeout for {domain}:{port} ({secs}s)")]
    ConnectTimeout { domain: String, port: u16, secs: u64 },

    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("TLS handshake timeout for {domain} ({secs}s)")]
    HandshakeTimeout { domain: String, secs: u64 },

    #[error("No TLS protocol version could be negotiated with {0}")]
    NoProtocolNegotiated(String),

    #[error("Certificate error: {0}")]
    Certificate(String),
}

impl TlsProbeError {
    /// Statistics category for this failure.
    pub fn error_type(&self) -> ErrorType {
        match self {
            TlsProbeError::InvalidDomain(_) => ErrorType::TlsInvalidDomain,
            TlsProbeError::ConnectTimeout { .. } => ErrorType::TlsConnectTimeout,
            TlsProbeError::ConnectFailed(_) => ErrorType::TlsConnectError,
            TlsProbeError::HandshakeTimeout { .. } => ErrorType::TlsHandshakeTimeout,
            TlsProbeError::NoProtocolNegotiated(_) => ErrorType::TlsNoProtocolNegotiated,
            TlsProbeError::Certificate(_) => ErrorType::TlsCertificateError,
        }
    }
}

/// PQC probe failures. Never fatal to the domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PqcProbeError {
    /// The probe did not finish within its timeout.
    #[error("Timeout")]
    Timeout,

    /// The external tool is not installed or cannot be started.
    #[error("PQC probe unavailable: {0}")]
    Unavailable(String),

    /// The tool ran but failed or produced unreadable output.
    #[error("PQC probe failed: {0}")]
    Failed(String),
}

impl PqcProbeError {
    pub fn warning_type(&self) -> WarningType {
        match self {
            PqcProbeError::Timeout => WarningType::PqcTimeout,
            PqcProbeError::Unavailable(_) => WarningType::PqcUnavailable,
            PqcProbeError::Failed(_) => WarningType::PqcProbeFailed,
        }
    }
}

/// Geolocation failures. Never fatal to the domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    #[error("Could not resolve IP for domain {0}")]
    Resolution(String),

    #[error("GeoIP lookup failed for {ip}: {reason}")]
    Lookup { ip: String, reason: String },
}

/// Types of errors that make a domain scan fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    TlsInvalidDomain,
    TlsConnectTimeout,
    TlsConnectError,
    TlsHandshakeTimeout,
    TlsNoProtocolNegotiated,
    TlsCertificateError,
    /// The whole per-domain pipeline exceeded its deadline
    ScanTimeout,
    /// The per-domain task terminated abnormally
    TaskPanicked,
}

/// Degraded-but-successful outcomes worth counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    PqcTimeout,
    PqcUnavailable,
    PqcProbeFailed,
    GeoLookupFailed,
    MissingGeoLocation,
    MissingCertificate,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::TlsInvalidDomain => "Invalid domain name",
            ErrorType::TlsConnectTimeout => "TCP connect timeout",
            ErrorType::TlsConnectError => "TCP connect error",
            ErrorType::TlsHandshakeTimeout => "TLS handshake timeout",
            ErrorType::TlsNoProtocolNegotiated => "No TLS protocol negotiated",
            ErrorType::TlsCertificateError => "Certificate error",
            ErrorType::ScanTimeout => "Domain scan timeout",
            ErrorType::TaskPanicked => "Scan task panicked",
        }
    }
}

impl std::fmt::Display for WarningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WarningType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::PqcTimeout => "PQC probe timeout",
            WarningType::PqcUnavailable => "PQC probe unavailable",
            WarningType::PqcProbeFailed => "PQC probe failed",
            WarningType::GeoLookupFailed => "GeoIP lookup failed",
            WarningType::MissingGeoLocation => "Missing GeoIP location",
            WarningType::MissingCertificate => "Missing certificate",
        }
    }
}
