//! PQC probe running the external `pqcscan` tool.
//!
//! `pqcscan tls-scan -t host:port -o report.json` writes a JSON report of the
//! key-exchange groups the server accepts. Each invocation is a short-lived
//! child process killed when its timeout expires.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use super::{PqcProbe, PqcProbeOutput};
use crate::error_handling::PqcProbeError;

const NOT_AVAILABLE: &str = "pqcscan not available";
const NO_RESULTS: &str = "No results in pqcscan output";

#[derive(Debug, Deserialize)]
struct PqcscanReport {
    #[serde(default)]
    results: Vec<PqcscanResult>,
}

#[derive(Debug, Deserialize)]
struct PqcscanResult {
    #[serde(rename = "Tls", default)]
    tls: Option<PqcscanTls>,
}

#[derive(Debug, Default, Deserialize)]
struct PqcscanTls {
    #[serde(default)]
    pqc_supported: bool,
    #[serde(default)]
    hybrid_algos: Vec<String>,
    #[serde(default)]
    pqc_algos: Vec<String>,
    #[serde(default)]
    nonpqc_algos: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Parses a `pqcscan` JSON report.
///
/// The first TLS result is used. A report without one is not an error: it is
/// returned as unsupported with a diagnostic message.
pub fn parse_pqcscan_report(json: &str) -> Result<PqcProbeOutput, PqcProbeError> {
    let report: PqcscanReport = serde_json::from_str(json)
        .map_err(|e| PqcProbeError::Failed(format!("invalid pqcscan output: {e}")))?;

    let Some(tls) = report.results.into_iter().find_map(|r| r.tls) else {
        return Ok(PqcProbeOutput {
            error: Some(NO_RESULTS.to_string()),
            ..Default::default()
        });
    };

    Ok(PqcProbeOutput {
        pqc_supported: tls.pqc_supported,
        hybrid_algorithms: tls.hybrid_algos,
        pqc_only_algorithms: tls.pqc_algos,
        non_pqc_algorithms: tls.nonpqc_algos,
        error: tls.error,
    })
}

/// Runs `pqcscan` from a fixed binary path.
#[derive(Debug, Clone)]
pub struct PqcscanProbe {
    binary: PathBuf,
}

impl PqcscanProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, target: &str, out: &Path) -> Result<(), PqcProbeError> {
        let output = Command::new(&self.binary)
            .arg("tls-scan")
            .arg("-t")
            .arg(target)
            .arg("-o")
            .arg(out)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    PqcProbeError::Unavailable(format!("{NOT_AVAILABLE}: {e}"))
                }
                _ => PqcProbeError::Failed(format!("failed to start pqcscan: {e}")),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PqcProbeError::Failed(format!(
                "pqcscan error: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl PqcProbe for PqcscanProbe {
    async fn probe(
        &self,
        target: &str,
        timeout: Duration,
    ) -> Result<PqcProbeOutput, PqcProbeError> {
        if !self.binary.exists() {
            return Err(PqcProbeError::Unavailable(NOT_AVAILABLE.to_string()));
        }

        // Removed when dropped, including on timeout
        let report_file = tempfile::Builder::new()
            .prefix("pqcscan-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| PqcProbeError::Failed(format!("cannot create report file: {e}")))?;

        match tokio::time::timeout(timeout, self.run(target, report_file.path())).await {
            Ok(result) => result?,
            Err(_) => {
                log::debug!("pqcscan timed out for {target} after {}s", timeout.as_secs());
                return Err(PqcProbeError::Timeout);
            }
        }

        let json = tokio::fs::read_to_string(report_file.path())
            .await
            .map_err(|e| PqcProbeError::Failed(format!("cannot read pqcscan report: {e}")))?;
        parse_pqcscan_report(&json)
    }
}

/// Stand-in used when no `pqcscan` binary is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPqcProbe;

impl PqcProbe for DisabledPqcProbe {
    async fn probe(
        &self,
        _target: &str,
        _timeout: Duration,
    ) -> Result<PqcProbeOutput, PqcProbeError> {
        Err(PqcProbeError::Unavailable(NOT_AVAILABLE.to_string()))
    }
}
