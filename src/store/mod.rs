//! Persistence collaborator abstraction for session snapshots.

use crate::domain::{SessionId, SessionState};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

pub mod memory;
pub mod migrate;

pub use memory::MemorySnapshotStore;
pub use migrate::{migrate, to_record, MigrateError, SCHEMA_VERSION};

/// Snapshot store trait for loading and saving whole sessions.
///
/// Implementations normalize stored records through [`migrate`] on load so
/// callers only ever see current-schema state.
#[async_trait]
pub trait SnapshotStore: Send + Sync + fmt::Debug {
    /// Load the snapshot for a session.
    ///
    /// # Returns
    /// `None` if no snapshot has been saved for this session.
    async fn load_snapshot(&self, session_id: &SessionId)
        -> Result<Option<SessionState>, StoreError>;

    /// Save (replace) the snapshot for a session.
    async fn save_snapshot(
        &self,
        session_id: &SessionId,
        state: &SessionState,
    ) -> Result<(), StoreError>;

    /// Ids of all sessions with a saved snapshot.
    async fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError>;
}

/// Error type for snapshot store operations.
#[derive(Debug, Clone)]
pub enum StoreError {
    /// Backend unavailable or the write was refused.
    Backend(String),
    /// Stored record could not be decoded.
    Corrupt(String),
    /// Encoding the snapshot failed.
    Encode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "Store backend error: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "Corrupt snapshot: {}", msg),
            StoreError::Encode(msg) => write!(f, "Snapshot encode error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<MigrateError> for StoreError {
    fn from(err: MigrateError) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Encode(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Outcome of a save requested after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub requested: bool,
    pub acknowledged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveReport {
    pub fn acknowledged() -> Self {
        Self {
            requested: true,
            acknowledged: true,
            error: None,
        }
    }

    pub fn failed(err: &StoreError) -> Self {
        Self {
            requested: true,
            acknowledged: false,
            error: Some(err.to_string()),
        }
    }
}
