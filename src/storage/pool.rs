//! Database connection pool management.
//!
//! Creates the database file when missing and enables WAL mode so exports or
//! ad-hoc queries can read while a run writes.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use log::{debug, error};
use sqlx::{Pool, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;

/// Opens (creating if needed) the SQLite database at `db_path`.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<Arc<Pool<Sqlite>>, DatabaseError> {
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(db_path)
    {
        Ok(_) => debug!("Created database file {}", db_path.display()),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Using existing database file {}", db_path.display())
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(DatabaseError::FileCreationError(format!(
                "{}: {e}",
                db_path.display()
            )));
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path.display()))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(Arc::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.db");
        assert!(!path.exists());
        let pool = init_db_pool_with_path(&path).await.unwrap();
        assert!(path.exists());
        pool.close().await;
    }

    #[tokio::test]
    async fn test_unwritable_location_fails() {
        let result = init_db_pool_with_path(Path::new("/nonexistent/dir/scan.db")).await;
        assert!(matches!(result, Err(DatabaseError::FileCreationError(_))));
    }
}
