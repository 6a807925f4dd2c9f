//! Export of aggregated scan results.
//!
//! - JSON: the full `AggregateSnapshot`, nested, for dashboards
//! - CSV: one flattened row per `ScanSummary`, for spreadsheets

mod csv;
mod json;

pub use csv::export_summaries_csv;
pub use json::export_snapshot_json;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Opens `output` for writing, or stdout when `None`.
fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(io::BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}
