//! Configuration types and CLI options.
//!
//! `Config` is parsed from the command line by the binary and can also be
//! constructed programmatically (with `..Default::default()`) by library users.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_GEOIP_PATH, DEFAULT_INPUT_FILE, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_PQCSCAN_RELATIVE_PATH, DEFAULT_PQC_TIMEOUT_SECS, DEFAULT_TLS_TIMEOUT_SECS,
    MAX_CONCURRENCY,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Default location of the `pqcscan` binary (`~/.local/bin/pqcscan`).
///
/// Falls back to a relative path when no home directory can be determined.
pub fn default_pqcscan_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DEFAULT_PQCSCAN_RELATIVE_PATH))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PQCSCAN_RELATIVE_PATH))
}

/// Scanner configuration.
///
/// # Examples
///
/// ```bash
/// # Scan the top 50 domains of the Majestic Million list
/// pqc_scanner majestic_million.csv --limit 50
///
/// # Random sample of 200 domains, 10 workers, JSON snapshot
/// pqc_scanner majestic_million.csv --limit 200 --sample --max-concurrency 10 \
///     --snapshot-out snapshot.json
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pqc_scanner",
    about = "Scans ranked domains for TLS configuration and post-quantum key exchange support."
)]
pub struct Config {
    /// Ranked domain list (Majestic Million CSV format)
    #[arg(value_parser, default_value = DEFAULT_INPUT_FILE)]
    pub file: PathBuf,

    /// Maximum number of valid domain rows to scan (all rows if omitted)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Pick `--limit` rows at random instead of the top of the list
    #[arg(long, default_value_t = false)]
    pub sample: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, value_parser, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Number of domains scanned concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// TCP connect and TLS handshake timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TLS_TIMEOUT_SECS)]
    pub tls_timeout_seconds: u64,

    /// PQC probe timeout in seconds
    #[arg(long, default_value_t = DEFAULT_PQC_TIMEOUT_SECS)]
    pub pqc_timeout_seconds: u64,

    /// Path to the pqcscan binary. PQC probing is disabled if it does not exist.
    #[arg(long, value_parser, default_value_os_t = default_pqcscan_path())]
    pub pqcscan_path: PathBuf,

    /// GeoIP database path (MaxMind GeoLite2-City .mmdb file).
    /// GeoIP lookup is disabled if the file does not exist.
    #[arg(long, value_parser, default_value = DEFAULT_GEOIP_PATH)]
    pub geoip: PathBuf,

    /// Write the aggregate snapshot as JSON to this path
    #[arg(long, value_parser)]
    pub snapshot_out: Option<PathBuf>,

    /// Write one summary row per domain as CSV to this path
    #[arg(long, value_parser)]
    pub csv_out: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_INPUT_FILE),
            limit: None,
            sample: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            tls_timeout_seconds: DEFAULT_TLS_TIMEOUT_SECS,
            pqc_timeout_seconds: DEFAULT_PQC_TIMEOUT_SECS,
            pqcscan_path: default_pqcscan_path(),
            geoip: PathBuf::from(DEFAULT_GEOIP_PATH),
            snapshot_out: None,
            csv_out: None,
        }
    }
}

impl Config {
    /// Checks option values that clap cannot express as types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::InvalidConcurrency(format!(
                "max_concurrency {} exceeds the maximum of {}",
                self.max_concurrency, MAX_CONCURRENCY
            )));
        }
        if self.tls_timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout("tls_timeout_seconds"));
        }
        if self.pqc_timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout("pqc_timeout_seconds"));
        }
        match (self.limit, self.sample) {
            (Some(0), _) => Err(ConfigError::InvalidLimit(
                "limit must be at least 1".to_string(),
            )),
            (None, true) => Err(ConfigError::InvalidLimit(
                "--sample requires --limit".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.tls_timeout_seconds, 5);
        assert_eq!(config.pqc_timeout_seconds, 30);
        assert_eq!(config.limit, None);
        assert!(!config.sample);
        assert_eq!(config.db_path, PathBuf::from("./pqc_scanner.db"));
        assert!(config.pqcscan_path.ends_with(".local/bin/pqcscan"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConcurrency(_))
        ));
    }

    #[test]
    fn test_validate_rejects_excessive_concurrency() {
        let config = Config {
            max_concurrency: MAX_CONCURRENCY + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let config = Config {
            pqc_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout("pqc_timeout_seconds"))
        ));

        let config = Config {
            tls_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_limit_and_sample() {
        let zero_limit = Config {
            limit: Some(0),
            ..Default::default()
        };
        assert!(zero_limit.validate().is_err());

        let sample_without_limit = Config {
            sample: true,
            ..Default::default()
        };
        assert!(sample_without_limit.validate().is_err());

        let sampled = Config {
            limit: Some(50),
            sample: true,
            ..Default::default()
        };
        assert!(sampled.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing() {
        let config = Config::try_parse_from([
            "pqc_scanner",
            "top.csv",
            "--limit",
            "25",
            "--max-concurrency",
            "8",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(config.file, PathBuf::from("top.csv"));
        assert_eq!(config.limit, Some(25));
        assert_eq!(config.max_concurrency, 8);
        assert!(matches!(config.log_format, LogFormat::Json));
    }
}
