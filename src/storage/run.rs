//! Run metadata and statistics.

use sqlx::{Row, SqlitePool};

use crate::error_handling::DatabaseError;

/// Metadata recorded when a run starts.
#[derive(Debug, Clone)]
pub struct RunMetadata<'a> {
    pub run_id: &'a str,
    pub start_time_ms: i64,
    pub version: &'a str,
    pub input_file: Option<&'a str>,
    pub max_concurrency: usize,
}

/// Final counts recorded when a run finishes.
#[derive(Debug, Clone)]
pub struct RunStats<'a> {
    pub run_id: &'a str,
    pub total_domains: usize,
    pub successful_domains: usize,
    pub failed_domains: usize,
    pub elapsed_seconds: f64,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub version: Option<String>,
    pub start_time_ms: i64,
    pub end_time_ms: Option<i64>,
    pub total_domains: i64,
    pub successful_domains: i64,
    pub failed_domains: i64,
    pub elapsed_seconds: Option<f64>,
}

/// Inserts the metadata row for a run. An existing `run_id` is an error.
pub async fn insert_run_metadata(
    pool: &SqlitePool,
    meta: &RunMetadata<'_>,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO runs (run_id, version, input_file, max_concurrency, start_time_ms)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(meta.run_id)
    .bind(meta.version)
    .bind(meta.input_file)
    .bind(meta.max_concurrency as i64)
    .bind(meta.start_time_ms)
    .execute(pool)
    .await?;
    Ok(())
}

/// Records final counts; `end_time_ms` is set to now.
pub async fn update_run_stats(pool: &SqlitePool, stats: &RunStats<'_>) -> Result<(), DatabaseError> {
    let end_time_ms = chrono::Utc::now().timestamp_millis();

    sqlx::query(
        "UPDATE runs
         SET end_time_ms = ?, total_domains = ?, successful_domains = ?,
             failed_domains = ?, elapsed_seconds = ?
         WHERE run_id = ?",
    )
    .bind(end_time_ms)
    .bind(stats.total_domains as i64)
    .bind(stats.successful_domains as i64)
    .bind(stats.failed_domains as i64)
    .bind(stats.elapsed_seconds)
    .bind(stats.run_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Completed runs, newest first.
pub async fn query_run_history(
    pool: &SqlitePool,
    limit: Option<usize>,
) -> Result<Vec<RunSummary>, DatabaseError> {
    let mut sql = String::from(
        "SELECT run_id, version, start_time_ms, end_time_ms, total_domains,
                successful_domains, failed_domains, elapsed_seconds
         FROM runs
         WHERE end_time_ms IS NOT NULL
         ORDER BY start_time_ms DESC",
    );
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|row| RunSummary {
            run_id: row.get("run_id"),
            version: row.get("version"),
            start_time_ms: row.get("start_time_ms"),
            end_time_ms: row.get("end_time_ms"),
            total_domains: row.get("total_domains"),
            successful_domains: row.get("successful_domains"),
            failed_domains: row.get("failed_domains"),
            elapsed_seconds: row.get("elapsed_seconds"),
        })
        .collect())
}
