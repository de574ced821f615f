//! SQLite-backed snapshot store.

use crate::domain::{SessionId, SessionState};
use crate::store::{migrate, to_record, SnapshotStore, StoreError, SCHEMA_VERSION};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Repository holding one JSON snapshot row per session.
pub struct Repository {
    pool: SqlitePool,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Raw stored JSON and its recorded schema version.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored text is not JSON.
    pub async fn load_record(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<(u32, serde_json::Value)>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT version, snapshot
            FROM session_snapshots
            WHERE session_id = ?
            "#,
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let version: i64 = row.get("version");
        let snapshot: String = row.get("snapshot");
        let record = serde_json::from_str(&snapshot)
            .map_err(|e| StoreError::Corrupt(format!("session {}: {}", session_id, e)))?;
        Ok(Some((u32::try_from(version).unwrap_or(0), record)))
    }

    /// Store a raw record as-is, e.g. when importing an exported legacy session.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn import_record(
        &self,
        session_id: &SessionId,
        record: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let version = record
            .get("version")
            .and_then(|v| v.as_i64())
            .unwrap_or(1);
        self.upsert(session_id, version, &record.to_string()).await
    }

    async fn upsert(
        &self,
        session_id: &SessionId,
        version: i64,
        snapshot: &str,
    ) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp_millis();
        sqlx::query(
            r#"
            INSERT INTO session_snapshots (session_id, version, snapshot, created_at_ms, updated_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                version = excluded.version,
                snapshot = excluded.snapshot,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(session_id.to_string())
        .bind(version)
        .bind(snapshot)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for Repository {
    async fn load_snapshot(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionState>, StoreError> {
        match self.load_record(session_id).await? {
            Some((version, record)) => {
                if version < SCHEMA_VERSION {
                    warn!(session = %session_id, version, "loading legacy snapshot");
                }
                Ok(Some(migrate(record)?))
            }
            None => Ok(None),
        }
    }

    async fn save_snapshot(
        &self,
        session_id: &SessionId,
        state: &SessionState,
    ) -> Result<(), StoreError> {
        let record = to_record(state)?;
        self.upsert(session_id, i64::from(SCHEMA_VERSION), &record.to_string())
            .await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT session_id
            FROM session_snapshots
            ORDER BY created_at_ms ASC, session_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.get("session_id");
            match SessionId::from_str(&raw) {
                Ok(id) => ids.push(id),
                Err(e) => warn!("Skipping session row with invalid id {}: {}", raw, e),
            }
        }
        Ok(ids)
    }
}
