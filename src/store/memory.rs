//! In-memory snapshot store for tests and ephemeral servers.

use super::{migrate, to_record, SnapshotStore, StoreError};
use crate::domain::{SessionId, SessionState};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Snapshot store that keeps encoded records in a map.
///
/// Records go through the same encode/migrate path as durable stores.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    records: Mutex<HashMap<SessionId, serde_json::Value>>,
    fail_saves: AtomicBool,
}

impl MemorySnapshotStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw (possibly legacy) record.
    pub fn with_record(self, session_id: SessionId, record: serde_json::Value) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.insert(session_id, record);
        }
        self
    }

    /// Make every subsequent save fail until switched back.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Raw stored record, as written.
    pub fn raw_record(&self, session_id: &SessionId) -> Option<serde_json::Value> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(session_id).cloned())
    }

    fn lock_error() -> StoreError {
        StoreError::Backend("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load_snapshot(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionState>, StoreError> {
        let record = {
            let records = self.records.lock().map_err(|_| Self::lock_error())?;
            records.get(session_id).cloned()
        };
        match record {
            Some(record) => Ok(Some(migrate(record)?)),
            None => Ok(None),
        }
    }

    async fn save_snapshot(
        &self,
        session_id: &SessionId,
        state: &SessionState,
    ) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("save rejected".to_string()));
        }
        let record = to_record(state)?;
        let mut records = self.records.lock().map_err(|_| Self::lock_error())?;
        records.insert(*session_id, record);
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let records = self.records.lock().map_err(|_| Self::lock_error())?;
        let mut ids: Vec<SessionId> = records.keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        Ok(ids)
    }
}
