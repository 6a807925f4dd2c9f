//! Configuration validation through the public API.

#![allow(clippy::field_reassign_with_default)]

use clap::Parser;
use pqc_scanner::error_handling::ConfigError;
use pqc_scanner::Config;

#[test]
fn test_default_config_is_valid() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = Config::default();
    config.max_concurrency = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidConcurrency(_))
    ));

    config = Config::default();
    config.max_concurrency = 1000;
    assert!(config.validate().is_err());

    config = Config::default();
    config.tls_timeout_seconds = 0;
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidTimeout("tls_timeout_seconds"))
    );

    config = Config::default();
    config.limit = Some(0);
    assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));

    config = Config::default();
    config.sample = true;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));
}

#[test]
fn test_cli_parsing() {
    let config = Config::try_parse_from([
        "pqc_scanner",
        "top.csv",
        "--limit",
        "200",
        "--sample",
        "--max-concurrency",
        "10",
        "--pqc-timeout-seconds",
        "15",
        "--log-format",
        "json",
        "--snapshot-out",
        "snapshot.json",
    ])
    .unwrap();

    assert_eq!(config.file, std::path::PathBuf::from("top.csv"));
    assert_eq!(config.limit, Some(200));
    assert!(config.sample);
    assert_eq!(config.max_concurrency, 10);
    assert_eq!(config.pqc_timeout_seconds, 15);
    assert_eq!(config.tls_timeout_seconds, 5);
    assert!(config.snapshot_out.is_some());
    assert!(config.csv_out.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_cli_rejects_unknown_log_format() {
    assert!(Config::try_parse_from(["pqc_scanner", "--log-format", "xml"]).is_err());
}
