//! Configuration constants.
//!
//! This module defines the operational parameters used throughout the scanner:
//! timeouts, concurrency bounds, default paths, and aggregation limits.

/// Default worker pool size.
/// Kept small: every worker holds outbound sockets and, for PQC, a child process.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;
/// Upper bound accepted by `Config::validate`
pub const MAX_CONCURRENCY: usize = 500;
/// Progress logging interval in seconds
pub const LOGGING_INTERVAL: u64 = 5;

/// Port every probe targets
pub const TLS_PORT: u16 = 443;

// Network operation timeouts
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connection and TLS handshake timeout (per handshake attempt) in seconds
pub const DEFAULT_TLS_TIMEOUT_SECS: u64 = 5;
/// PQC probe timeout in seconds
pub const DEFAULT_PQC_TIMEOUT_SECS: u64 = 30;
/// Handshakes one TLS probe may attempt: the baseline plus one per cipher suite
/// offered by the rustls ring provider.
pub const MAX_TLS_HANDSHAKES: u64 = 10;
/// Slack added to the per-domain deadline on top of DNS, for geolocation and grading
pub const DOMAIN_DEADLINE_MARGIN_SECS: u64 = 10;

// Default paths
pub const DEFAULT_INPUT_FILE: &str = "majestic_million.csv";
pub const DB_PATH: &str = "./pqc_scanner.db";
pub const DEFAULT_GEOIP_PATH: &str = "./data/GeoLite2-City.mmdb";
/// Relative to the user's home directory
pub const DEFAULT_PQCSCAN_RELATIVE_PATH: &str = ".local/bin/pqcscan";

// Aggregation
/// Number of cipher suites kept in the cipher distribution
pub const TOP_CIPHER_COUNT: usize = 10;
/// Raw issuer strings longer than this are truncated for display
pub const ISSUER_DISPLAY_LENGTH: usize = 30;
/// Bucket label for records without a value in a distribution
pub const UNKNOWN_LABEL: &str = "Unknown";
/// Grade bucket used for `ERROR` records
pub const ERROR_GRADE_LABEL: &str = "Error";

/// Maximum error message length stored in the database (characters)
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;
