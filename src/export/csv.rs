//! CSV export functionality.
//!
//! One row per scanned domain with list-valued details joined by `;`.

use std::path::Path;

use anyhow::Result;
use csv::Writer;

use super::open_output;
use crate::aggregate::ScanSummary;

const HEADER: [&str; 17] = [
    "domain",
    "rank",
    "status",
    "grade",
    "score",
    "pqc_supported",
    "tls_version",
    "ca_type",
    "issuer",
    "country",
    "date",
    "timestamp",
    "error_message",
    "pqc_algorithms",
    "cipher_suites",
    "cert_subject",
    "cert_valid_until",
];

/// Writes `summaries` as CSV and returns the number of rows written.
pub fn export_summaries_csv(summaries: &[ScanSummary], output: Option<&Path>) -> Result<usize> {
    let mut writer = Writer::from_writer(open_output(output)?);
    writer.write_record(HEADER)?;

    for summary in summaries {
        let details = &summary.details;
        let rank = summary.rank.to_string();
        let score = format!("{:.1}", summary.score);
        let timestamp = summary.timestamp.to_string();
        let pqc_algorithms = details.pqc_algorithms.join(";");
        let cipher_suites = details.cipher_suites.join(";");
        let row: [&str; 17] = [
            &summary.domain,
            &rank,
            summary.status.as_str(),
            &summary.grade,
            &score,
            if summary.pqc_supported { "true" } else { "false" },
            &summary.tls_version,
            &summary.ca_type,
            &summary.issuer,
            &summary.country,
            &summary.date,
            &timestamp,
            details.error_message.as_deref().unwrap_or(""),
            &pqc_algorithms,
            &cipher_suites,
            &details.certificate.subject,
            &details.certificate.valid_until,
        ];
        writer.write_record(row)?;
    }

    writer.flush()?;
    Ok(summaries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::models::{DomainEntry, ScanRecord};

    #[test]
    fn test_rows_written_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scans.csv");
        let summaries: Vec<ScanSummary> = ["a.example", "b.example"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                summarize(&ScanRecord::error(
                    DomainEntry::new(i as u64 + 1, *name, "example"),
                    chrono::Utc::now(),
                    "Connection refused, retry later",
                ))
            })
            .collect();

        let written = export_summaries_csv(&summaries, Some(&path)).unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), HEADER.len());
        assert_eq!(&headers[0], "domain");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "a.example");
        assert_eq!(&rows[0][3], "Error");
        assert_eq!(&rows[0][12], "Connection refused, retry later");
    }
}
