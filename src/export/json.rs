//! JSON snapshot export.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::open_output;
use crate::aggregate::AggregateSnapshot;

/// Writes `snapshot` as pretty-printed JSON.
pub fn export_snapshot_json(snapshot: &AggregateSnapshot, output: Option<&Path>) -> Result<()> {
    let mut writer = open_output(output)?;
    serde_json::to_writer_pretty(&mut writer, snapshot).context("Failed to serialize snapshot")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
