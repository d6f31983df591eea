//! SQLite connection handling and schema.

use std::path::Path;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use weather_common::{DisplayError, DisplayResult};

/// Timestamp layout stored in the `datetime` columns (server-local time).
///
/// Lexicographic order equals chronological order, and SQLite's `date()`
/// understands it directly.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_datetime(at: NaiveDateTime) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn db_error(context: &str, err: sqlx::Error) -> DisplayError {
    DisplayError::Database(format!("{}: {}", context, err))
}

/// Handle to the reading database.
///
/// Holds exactly one connection for the lifetime of a cycle. Call
/// [`MetricStore::close`] when the cycle ends, including on error paths.
pub struct MetricStore {
    pool: SqlitePool,
}

impl MetricStore {
    /// Open or create the database at the given path.
    pub async fn open(path: &Path) -> DisplayResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let store = Self::connect_with(options).await?;
        info!(path = %path.display(), "Opened metric store");
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub async fn open_memory() -> DisplayResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);

        Self::connect_with(options).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> DisplayResult<Self> {
        // A single connection; for `:memory:` every new connection would be
        // a fresh, empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| db_error("Connection failed", e))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> DisplayResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| db_error("Migration failed", e))?;
            }
        }

        debug!("Metric store schema ready");
        Ok(())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Release the connection.
    pub async fn close(self) {
        self.pool.close().await;
        debug!("Closed metric store");
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sensor_data (
    sensor TEXT NOT NULL,
    value REAL NOT NULL,
    datetime TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_sensor_data_sensor_time ON sensor_data(sensor, datetime);

CREATE TABLE IF NOT EXISTS air_quality (
    pollutant TEXT NOT NULL,
    measurement REAL NOT NULL,
    datetime TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_air_quality_pollutant_time ON air_quality(pollutant, datetime)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_file_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("weather.db");

        let store = MetricStore::open(&path).await.unwrap();
        store.close().await;
        assert!(path.exists());

        // Reopening runs the idempotent migration again
        let store = MetricStore::open(&path).await.unwrap();
        store.close().await;
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = MetricStore::open_memory().await.unwrap();
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
        store.close().await;
    }
}
