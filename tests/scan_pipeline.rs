//! Orchestrator and aggregation through the public API with stub probes.

mod helpers;

use pqc_scanner::models::{CaType, Grade, ScanStatus};
use pqc_scanner::{aggregate, DomainEntry, Orchestrator, ScanSettings};

use helpers::{StubGeo, StubPqc, StubTls};

fn entries(names: &[&str]) -> Vec<DomainEntry> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| DomainEntry::new(i as u64 + 1, *name, "com"))
        .collect()
}

#[tokio::test]
async fn test_every_domain_gets_one_record_in_order() {
    let names: Vec<String> = (0..25).map(|i| format!("site{i}.com")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let tls = StubTls::default().failing("site3.com").failing("site17.com");

    let orchestrator = Orchestrator::new(tls, StubPqc::default(), StubGeo, ScanSettings::default());
    let records = orchestrator.run(entries(&refs), 3).await.unwrap();

    assert_eq!(records.len(), 25);
    for (record, name) in records.iter().zip(&names) {
        assert_eq!(&record.domain.name, name);
    }
    assert_eq!(records[3].status, ScanStatus::Error);
    assert_eq!(records[17].status, ScanStatus::Error);
    assert_eq!(orchestrator.progress().failed(), 2);
    assert_eq!(orchestrator.progress().completed(), 23);
}

#[tokio::test]
async fn test_success_records_cover_all_versions() {
    let orchestrator = Orchestrator::new(
        StubTls::default(),
        StubPqc::supporting(&["pq.com"]),
        StubGeo,
        ScanSettings::default(),
    );
    let records = orchestrator.run(entries(&["pq.com", "classic.com"]), 2).await.unwrap();

    for record in &records {
        assert_eq!(record.tls_versions.len(), 6);
        assert!(record.grade.is_some());
        assert!(record.score.is_some());
        assert_eq!(
            record.certificate.as_ref().map(|c| c.ca_type),
            Some(CaType::FreeCa)
        );
    }
    assert_eq!(records[0].grade, Some(Grade::S));
    assert!(records[0].pqc_supported());
    assert_eq!(records[1].grade, Some(Grade::A));
    assert_eq!(records[1].score, Some(95.0));
}

#[tokio::test]
async fn test_error_record_carries_probe_message() {
    let tls = StubTls::default().failing("down.com");
    let orchestrator = Orchestrator::new(tls, StubPqc::default(), StubGeo, ScanSettings::default());
    let records = orchestrator.run(entries(&["down.com"]), 1).await.unwrap();

    let record = &records[0];
    assert_eq!(record.status, ScanStatus::Error);
    assert!(record.grade.is_none());
    assert!(record
        .error_message
        .as_deref()
        .is_some_and(|m| m.contains("Connection refused")));
}

#[tokio::test]
async fn test_batch_snapshot() {
    let tls = StubTls::default().legacy("legacy.com").failing("down.com");
    let orchestrator = Orchestrator::new(
        tls,
        StubPqc::supporting(&["pq.com"]),
        StubGeo,
        ScanSettings::default(),
    );
    let records = orchestrator
        .run(entries(&["pq.com", "classic.com", "legacy.com", "down.com"]), 4)
        .await
        .unwrap();

    let snapshot = aggregate(&records);
    assert_eq!(snapshot.total_scans, 4);
    assert_eq!(snapshot.successful_scans, 3);
    assert_eq!(snapshot.error_scans, 1);
    assert_eq!(snapshot.pqc_count, 1);
    assert_eq!(snapshot.commercial_ca_count, 1);
    assert_eq!(snapshot.pqc_adoption_rate, 25.0);
    assert_eq!(snapshot.commercial_ca_rate, 25.0);
    // (100 + 95 + 40 + 0) / 4
    assert_eq!(snapshot.avg_score, 58.8);

    for grade in ["S", "A", "F", "Error"] {
        assert_eq!(snapshot.grade_distribution.get(grade), Some(&1), "{grade}");
    }
    assert_eq!(snapshot.tls_distribution.get("TLS 1.3"), Some(&2));
    assert_eq!(snapshot.tls_distribution.get("TLS 1.0"), Some(&1));
    assert_eq!(snapshot.ca_distribution.get("Let's Encrypt"), Some(&2));
    assert_eq!(snapshot.ca_distribution.get("DigiCert Inc"), Some(&1));
    assert_eq!(snapshot.pqc_algo_distribution.get("X25519MLKEM768"), Some(&1));
    assert_eq!(snapshot.geo_distribution.get("Germany"), Some(&3));
    assert_eq!(snapshot.scans.len(), 4);
}
