//! End-to-end batch runs: input file to database and exports.

mod helpers;

use sqlx::Row;
use tempfile::TempDir;

use pqc_scanner::storage::{init_db_pool_with_path, load_latest_snapshot};
use pqc_scanner::{query_run_history, run_scan, run_scan_with};

use helpers::{test_config, write_domains_csv, StubGeo, StubPqc, StubTls};

#[tokio::test]
async fn test_run_persists_records_and_exports() {
    let dir = TempDir::new().unwrap();
    let input = write_domains_csv(&[
        (1, "pq.com", "com"),
        (2, "classic.com", "com"),
        (3, "legacy.com", "com"),
        (4, "down.com", "com"),
    ]);
    let db_path = dir.path().join("scan.db");
    let snapshot_path = dir.path().join("snapshot.json");
    let csv_path = dir.path().join("scans.csv");

    let mut config = test_config(input.path().to_path_buf(), db_path.clone());
    config.snapshot_out = Some(snapshot_path.clone());
    config.csv_out = Some(csv_path.clone());

    let tls = StubTls::default().legacy("legacy.com").failing("down.com");
    let report = run_scan_with(config, tls, StubPqc::supporting(&["pq.com"]), StubGeo)
        .await
        .unwrap();

    assert_eq!(report.total, 4);
    assert_eq!(report.successful, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.unsaved_records, 0);
    assert!(report.run_id.starts_with("run_"));
    assert_eq!(report.snapshot.grade_distribution.get("S"), Some(&1));

    let pool = init_db_pool_with_path(&db_path).await.unwrap();
    let scan_rows: i64 = sqlx::query("SELECT COUNT(*) FROM scan_results WHERE run_id = ?")
        .bind(&report.run_id)
        .fetch_one(pool.as_ref())
        .await
        .unwrap()
        .get(0);
    assert_eq!(scan_rows, 4);

    let error_rows: i64 =
        sqlx::query("SELECT COUNT(*) FROM scan_results WHERE scan_status = 'ERROR'")
            .fetch_one(pool.as_ref())
            .await
            .unwrap()
            .get(0);
    assert_eq!(error_rows, 1);

    let history = query_run_history(&pool, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].run_id, report.run_id);
    assert_eq!(history[0].total_domains, 4);
    assert_eq!(history[0].failed_domains, 1);

    let cached = load_latest_snapshot(&pool).await.unwrap().unwrap();
    assert_eq!(cached.total_scans, 4);
    pool.close().await;

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
    assert_eq!(json["successful_scans"], 3);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.records().count(), 4);
}

#[tokio::test]
async fn test_rescan_appends_new_rows() {
    let dir = TempDir::new().unwrap();
    let input = write_domains_csv(&[(1, "a.com", "com"), (2, "b.com", "com")]);
    let db_path = dir.path().join("scan.db");

    for _ in 0..2 {
        let config = test_config(input.path().to_path_buf(), db_path.clone());
        run_scan_with(config, StubTls::default(), StubPqc::default(), StubGeo)
            .await
            .unwrap();
        // Run ids have millisecond resolution
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let pool = init_db_pool_with_path(&db_path).await.unwrap();
    let count = |sql: &'static str| {
        let pool = pool.clone();
        async move {
            sqlx::query(sql)
                .fetch_one(pool.as_ref())
                .await
                .unwrap()
                .get::<i64, _>(0)
        }
    };
    assert_eq!(count("SELECT COUNT(*) FROM scan_results").await, 4);
    assert_eq!(count("SELECT COUNT(*) FROM domains").await, 2);
    assert_eq!(count("SELECT COUNT(*) FROM runs").await, 2);
    pool.close().await;
}

#[tokio::test]
async fn test_invalid_config_fails_before_scanning() {
    let dir = TempDir::new().unwrap();
    let input = write_domains_csv(&[(1, "a.com", "com")]);
    let db_path = dir.path().join("scan.db");
    let mut config = test_config(input.path().to_path_buf(), db_path.clone());
    config.max_concurrency = 0;

    let result = run_scan_with(config, StubTls::default(), StubPqc::default(), StubGeo).await;
    assert!(result.is_err());
    assert!(!db_path.exists());
}

#[tokio::test]
async fn test_missing_input_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().join("missing.csv"), dir.path().join("scan.db"));
    let err = run_scan_with(config, StubTls::default(), StubPqc::default(), StubGeo)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Failed to load domains"));
}

#[tokio::test]
async fn test_unresolvable_domains_with_real_probes() {
    let dir = TempDir::new().unwrap();
    let input = write_domains_csv(&[(1, "nothing-here.invalid", "invalid")]);
    let config = test_config(input.path().to_path_buf(), dir.path().join("scan.db"));

    let report = run_scan(config).await.unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.snapshot.grade_distribution.get("Error"), Some(&1));
}
