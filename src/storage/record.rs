//! Scan record persistence.
//!
//! Each record is written in its own transaction: the domain row is upserted,
//! then a fresh `scan_results` row and its child rows are appended.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::config::MAX_ERROR_MESSAGE_LENGTH;
use crate::error_handling::DatabaseError;
use crate::models::{CertificateInfo, GeoLocation, PqcInfo, ScanRecord};

/// Persists one scan record and returns its `scan_results` id.
pub async fn insert_scan_record(
    pool: &SqlitePool,
    run_id: Option<&str>,
    record: &ScanRecord,
) -> Result<i64, DatabaseError> {
    let mut tx = pool.begin().await?;

    let domain_id: i64 = sqlx::query_scalar(
        "INSERT INTO domains (name, tld, global_rank) VALUES (?, ?, ?)
         ON CONFLICT(name) DO UPDATE SET tld = excluded.tld, global_rank = excluded.global_rank
         RETURNING id",
    )
    .bind(&record.domain.name)
    .bind(&record.domain.tld)
    .bind(record.domain.rank as i64)
    .fetch_one(&mut *tx)
    .await?;

    let error_message = record
        .error_message
        .as_deref()
        .map(|msg| truncate_message(msg, MAX_ERROR_MESSAGE_LENGTH));

    let scan_id = sqlx::query(
        "INSERT INTO scan_results
             (domain_id, run_id, scan_date_ms, scan_status, error_message, grade, score)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(domain_id)
    .bind(run_id)
    .bind(record.scan_timestamp.timestamp_millis())
    .bind(record.status.as_str())
    .bind(error_message)
    .bind(record.grade.map(|g| g.as_str()))
    .bind(record.score)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for observation in &record.tls_versions {
        sqlx::query("INSERT INTO tls_versions (scan_result_id, version, is_supported) VALUES (?, ?, ?)")
            .bind(scan_id)
            .bind(observation.version.as_str())
            .bind(observation.supported)
            .execute(&mut *tx)
            .await?;
    }

    for cipher in &record.ciphers {
        sqlx::query(
            "INSERT INTO cipher_suites (scan_result_id, name, tls_version, is_weak, is_forward_secret)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(scan_id)
        .bind(&cipher.name)
        .bind(&cipher.tls_version)
        .bind(cipher.is_weak)
        .bind(cipher.is_forward_secret)
        .execute(&mut *tx)
        .await?;
    }

    if let Some(cert) = &record.certificate {
        insert_certificate(&mut tx, scan_id, cert).await?;
    }
    if let Some(pqc) = &record.pqc {
        insert_pqc_info(&mut tx, scan_id, pqc).await?;
    }
    if let Some(geo) = &record.geo {
        insert_geo_location(&mut tx, scan_id, geo).await?;
    }

    tx.commit().await?;
    Ok(scan_id)
}

async fn insert_certificate(
    tx: &mut Transaction<'_, Sqlite>,
    scan_id: i64,
    cert: &CertificateInfo,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO certificates
             (scan_result_id, issuer, subject, signature_algorithm, public_key_algorithm,
              public_key_size, valid_from_ms, valid_until_ms, ca_type, pem)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(scan_id)
    .bind(&cert.issuer)
    .bind(&cert.subject)
    .bind(&cert.signature_algorithm)
    .bind(&cert.public_key_algorithm)
    .bind(cert.public_key_size)
    .bind(cert.valid_from.timestamp_millis())
    .bind(cert.valid_until.timestamp_millis())
    .bind(cert.ca_type.as_str())
    .bind(&cert.pem)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_pqc_info(
    tx: &mut Transaction<'_, Sqlite>,
    scan_id: i64,
    pqc: &PqcInfo,
) -> Result<(), DatabaseError> {
    let suites = serde_json::to_string(&pqc.supported_suites)?;
    let hybrids = serde_json::to_string(&pqc.hybrid_combinations)?;

    sqlx::query(
        "INSERT INTO pqc_info
             (scan_result_id, is_supported, supports_mlkem512, supports_mlkem768,
              supports_mlkem1024, supported_suites, hybrid_combinations, error)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(scan_id)
    .bind(pqc.supported)
    .bind(pqc.supports_mlkem512)
    .bind(pqc.supports_mlkem768)
    .bind(pqc.supports_mlkem1024)
    .bind(suites)
    .bind(hybrids)
    .bind(pqc.error.as_deref())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_geo_location(
    tx: &mut Transaction<'_, Sqlite>,
    scan_id: i64,
    geo: &GeoLocation,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO geo_locations
             (scan_result_id, ip_address, country_code, country_name, region, city,
              latitude, longitude)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(scan_id)
    .bind(&geo.ip_address)
    .bind(&geo.country_code)
    .bind(&geo.country_name)
    .bind(geo.region.as_deref())
    .bind(geo.city.as_deref())
    .bind(geo.latitude)
    .bind(geo.longitude)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Cuts `msg` to at most `max` bytes on a char boundary.
fn truncate_message(msg: &str, max: usize) -> &str {
    if msg.len() <= max {
        return msg;
    }
    let mut end = max;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    &msg[..end]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{TimeZone, Utc};
    use sqlx::Row;

    use super::*;
    use crate::models::{
        CaType, CipherObservation, DomainEntry, Grade, ScanStatus, TlsVersion,
        TlsVersionObservation,
    };
    use crate::storage::test_helpers::{count_rows, create_test_pool};

    fn success_record(name: &str) -> ScanRecord {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ScanRecord {
            domain: DomainEntry::new(7, name, "com"),
            scan_timestamp: ts,
            status: ScanStatus::Success,
            error_message: None,
            tls_versions: TlsVersion::ALL
                .into_iter()
                .map(|version| TlsVersionObservation {
                    version,
                    supported: !version.is_deprecated(),
                })
                .collect(),
            ciphers: vec![CipherObservation {
                name: "TLS13_AES_128_GCM_SHA256".to_string(),
                tls_version: "TLS 1.3".to_string(),
                is_weak: false,
                is_forward_secret: true,
            }],
            certificate: Some(CertificateInfo {
                issuer: "C=US, O=Let's Encrypt, CN=R3".to_string(),
                subject: format!("CN={name}"),
                signature_algorithm: "sha256WithRSAEncryption".to_string(),
                public_key_algorithm: "RSA".to_string(),
                public_key_size: 2048,
                valid_from: ts,
                valid_until: ts,
                ca_type: CaType::FreeCa,
                pem: String::new(),
            }),
            pqc: Some(PqcInfo {
                supported: true,
                supports_mlkem768: true,
                supported_suites: BTreeSet::from(["X25519MLKEM768".to_string()]),
                hybrid_combinations: BTreeSet::from(["X25519MLKEM768".to_string()]),
                ..PqcInfo::default()
            }),
            geo: Some(GeoLocation {
                ip_address: "93.184.216.34".to_string(),
                country_code: "US".to_string(),
                country_name: "United States".to_string(),
                region: None,
                city: None,
                latitude: 37.751,
                longitude: -97.822,
            }),
            grade: Some(Grade::S),
            score: Some(100.0),
        }
    }

    #[tokio::test]
    async fn test_success_record_writes_child_rows() {
        let pool = create_test_pool().await;
        let scan_id = insert_scan_record(&pool, None, &success_record("example.com"))
            .await
            .unwrap();

        assert_eq!(count_rows(&pool, "scan_results").await, 1);
        assert_eq!(count_rows(&pool, "tls_versions").await, 6);
        assert_eq!(count_rows(&pool, "cipher_suites").await, 1);
        assert_eq!(count_rows(&pool, "certificates").await, 1);
        assert_eq!(count_rows(&pool, "geo_locations").await, 1);

        let row = sqlx::query("SELECT supported_suites FROM pqc_info WHERE scan_result_id = ?")
            .bind(scan_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        let suites: String = row.get("supported_suites");
        assert_eq!(suites, r#"["X25519MLKEM768"]"#);
    }

    #[tokio::test]
    async fn test_rescan_appends_and_reuses_domain() {
        let pool = create_test_pool().await;
        let first = insert_scan_record(&pool, None, &success_record("example.com"))
            .await
            .unwrap();
        let second = insert_scan_record(&pool, None, &success_record("example.com"))
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(count_rows(&pool, "domains").await, 1);
        assert_eq!(count_rows(&pool, "scan_results").await, 2);
    }

    #[tokio::test]
    async fn test_error_record_is_truncated() {
        let pool = create_test_pool().await;
        let long = "x".repeat(MAX_ERROR_MESSAGE_LENGTH + 500);
        let record = ScanRecord::error(DomainEntry::new(1, "down.example", "example"), Utc::now(), long);
        insert_scan_record(&pool, None, &record).await.unwrap();

        let row = sqlx::query("SELECT scan_status, error_message, grade FROM scan_results")
            .fetch_one(&pool)
            .await
            .unwrap();
        let status: String = row.get("scan_status");
        let message: String = row.get("error_message");
        let grade: Option<String> = row.get("grade");
        assert_eq!(status, "ERROR");
        assert_eq!(message.len(), MAX_ERROR_MESSAGE_LENGTH);
        assert!(grade.is_none());
        assert_eq!(count_rows(&pool, "certificates").await, 0);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate_message("héllo", 2), "h");
        assert_eq!(truncate_message("short", 100), "short");
    }
}
