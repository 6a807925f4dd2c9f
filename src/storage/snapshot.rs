//! Cached aggregate snapshots.

use sqlx::SqlitePool;

use crate::aggregate::AggregateSnapshot;
use crate::error_handling::DatabaseError;

/// Stores `snapshot` as JSON under `run_id`.
pub async fn insert_statistics_snapshot(
    pool: &SqlitePool,
    run_id: Option<&str>,
    snapshot: &AggregateSnapshot,
) -> Result<(), DatabaseError> {
    let json = serde_json::to_string(snapshot)?;
    sqlx::query(
        "INSERT INTO statistics_cache (run_id, generated_at_ms, snapshot_json) VALUES (?, ?, ?)",
    )
    .bind(run_id)
    .bind(snapshot.generated_at.timestamp_millis())
    .bind(json)
    .execute(pool)
    .await?;
    Ok(())
}

/// Most recently generated snapshot, if any.
pub async fn load_latest_snapshot(
    pool: &SqlitePool,
) -> Result<Option<AggregateSnapshot>, DatabaseError> {
    let json: Option<String> = sqlx::query_scalar(
        "SELECT snapshot_json FROM statistics_cache ORDER BY generated_at_ms DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    json.map(|j| serde_json::from_str(&j))
        .transpose()
        .map_err(DatabaseError::from)
}
