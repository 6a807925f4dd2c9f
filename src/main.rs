//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `pqc_scanner` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use pqc_scanner::initialization::init_logger_with;
use pqc_scanner::{run_scan, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_scan(config).await {
        Ok(report) => {
            println!(
                "✅ Scanned {} domain{} ({} graded, {} failed) in {:.1}s",
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.successful,
                report.failed,
                report.elapsed_seconds
            );
            println!(
                "PQC adoption: {:.1}%  Commercial CA: {:.1}%  Average score: {:.1}",
                report.snapshot.pqc_adoption_rate,
                report.snapshot.commercial_ca_rate,
                report.snapshot.avg_score
            );
            println!("Results saved in {} ({})", report.db_path.display(), report.run_id);
            Ok(())
        }
        Err(e) => {
            eprintln!("pqc_scanner error: {:#}", e);
            process::exit(1);
        }
    }
}
