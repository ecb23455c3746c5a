//! Durable snapshot persistence over SQLite.
//!
//! One row per resolved model: the record as a self-describing JSON blob
//! plus the publish timestamp. Restoring loads every row and hands the
//! records back through the store's normal snapshot build, so a warm start
//! is indistinguishable from a completed refresh.

mod error;

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteConnectOptions};

pub use error::{DbError, DbResult};

use crate::catalog::{CatalogSnapshot, ModelRecord};

/// Handle to the on-disk catalog cache.
#[derive(Clone)]
pub struct CatalogDb {
    pool: SqlitePool,
}

impl CatalogDb {
    /// Open (creating if missing) the database at `path` and ensure the
    /// schema exists.
    pub async fn connect(path: impl AsRef<Path>) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Wrap an existing pool (tests use `sqlite::memory:`).
    #[cfg(test)]
    pub async fn with_pool(pool: SqlitePool) -> DbResult<Self> {
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> DbResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS models (
                id TEXT PRIMARY KEY NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace the persisted catalog with the given snapshot's records.
    ///
    /// Runs in one transaction: a reader of the database (or a crashed
    /// restart) sees either the previous catalog or the new one, never a
    /// partial write.
    pub async fn persist(&self, snapshot: &CatalogSnapshot) -> DbResult<()> {
        let saved_at = snapshot.last_refreshed.unwrap_or_else(Utc::now);

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM models").execute(&mut *tx).await?;

        for model in &snapshot.models_list {
            let data = serde_json::to_string(model.as_ref())?;
            sqlx::query("INSERT INTO models (id, data, updated_at) VALUES (?, ?, ?)")
                .bind(&model.id)
                .bind(data)
                .bind(saved_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(count = snapshot.len(), "Persisted catalog snapshot");
        Ok(())
    }

    /// Load the persisted catalog. `Ok(None)` means the cache is empty;
    /// the returned timestamp is the most recent `updated_at` across rows.
    pub async fn restore(&self) -> DbResult<Option<(Vec<ModelRecord>, DateTime<Utc>)>> {
        let rows = sqlx::query("SELECT id, data, updated_at FROM models")
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut models = Vec::with_capacity(rows.len());
        let mut saved_at: Option<DateTime<Utc>> = None;

        for row in rows {
            let data: String = row.get("data");
            let model: ModelRecord = serde_json::from_str(&data)?;
            let updated_at: DateTime<Utc> = row.get("updated_at");
            saved_at = Some(saved_at.map_or(updated_at, |t| t.max(updated_at)));
            models.push(model);
        }

        let saved_at = saved_at.unwrap_or_else(Utc::now);
        tracing::info!(count = models.len(), "Restored catalog from database");
        Ok(Some((models, saved_at)))
    }
}
