use crate::domain::{SessionConfig, SessionId, SessionState};
use crate::engine::{summarize, Access, Ledger, LedgerError, SessionSummary, StateChange};
use crate::store::{SaveReport, SnapshotStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

type SessionHandle = Arc<Mutex<SessionState>>;

/// Result of a mutation applied through the orchestrator.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub change: StateChange,
    pub summary: SessionSummary,
    pub saved: SaveReport,
}

/// Owns live sessions and serializes writes to each one.
///
/// Every mutation holds the session's lock from the ledger call through the
/// save request, so at most one writer touches a session at a time. The
/// in-memory mutation stands even when the store rejects the save.
///
/// The session map lock is only held for lookups and inserts, never across
/// store I/O. When both are needed, the session lock is taken first.
pub struct SessionOrchestrator {
    store: Arc<dyn SnapshotStore>,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    default_config: SessionConfig,
}

impl SessionOrchestrator {
    pub fn new(store: Arc<dyn SnapshotStore>, default_config: SessionConfig) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
            default_config,
        }
    }

    pub fn default_config(&self) -> SessionConfig {
        self.default_config
    }

    /// Start an empty session and request its first save.
    pub async fn create_session(
        &self,
        config: Option<SessionConfig>,
    ) -> Result<(SessionId, SaveReport), OrchestrationError> {
        let id = SessionId::generate();
        let state = SessionState::new(config.unwrap_or(self.default_config));
        let saved = self.save(&id, &state).await;

        self.sessions
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(state)));
        info!(session = %id, "session created");
        Ok((id, saved))
    }

    /// Ids of live and stored sessions.
    pub async fn list_sessions(&self) -> Result<Vec<SessionId>, OrchestrationError> {
        let mut ids = self.store.list_sessions().await?;
        let live = self.sessions.lock().await;
        for id in live.keys() {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        Ok(ids)
    }

    /// Number of sessions currently held in memory.
    pub async fn live_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Immutable copy of the session for read-only views and reports.
    pub async fn snapshot(&self, id: &SessionId) -> Result<SessionState, OrchestrationError> {
        let state = self.lock_live(id).await?;
        Ok(state.clone())
    }

    /// Save a live session and drop it from memory.
    ///
    /// Returns `Ok(false)` when the session is not live. If the save fails the
    /// session stays live and the store error is returned.
    pub async fn evict(&self, id: &SessionId) -> Result<bool, OrchestrationError> {
        let handle = match self.sessions.lock().await.get(id) {
            Some(handle) => handle.clone(),
            None => return Ok(false),
        };
        let state = handle.lock().await;
        if !self.is_live(id, &handle).await {
            return Ok(false);
        }
        self.store.save_snapshot(id, &state).await?;

        self.sessions.lock().await.remove(id);
        info!(session = %id, "session evicted");
        Ok(true)
    }

    /// Apply one ledger operation and request a save if it succeeded.
    pub async fn mutate<F>(
        &self,
        id: &SessionId,
        access: Access,
        op: F,
    ) -> Result<MutationOutcome, OrchestrationError>
    where
        F: FnOnce(&mut Ledger<'_>) -> Result<StateChange, LedgerError>,
    {
        let mut state = self.lock_live(id).await?;

        let change = {
            let mut ledger = Ledger::new(&mut state, access);
            op(&mut ledger)?
        };
        let saved = self.save(id, &state).await;

        Ok(MutationOutcome {
            change,
            summary: summarize(&state),
            saved,
        })
    }

    async fn save(&self, id: &SessionId, state: &SessionState) -> SaveReport {
        match self.store.save_snapshot(id, state).await {
            Ok(()) => SaveReport::acknowledged(),
            Err(e) => {
                warn!(session = %id, "snapshot save failed: {}", e);
                SaveReport::failed(&e)
            }
        }
    }

    /// Lock the live copy of a session, loading it first if needed.
    ///
    /// Retries when the session was evicted while this caller waited for its lock.
    async fn lock_live(
        &self,
        id: &SessionId,
    ) -> Result<OwnedMutexGuard<SessionState>, OrchestrationError> {
        loop {
            let handle = self.handle(id).await?;
            let guard = handle.clone().lock_owned().await;
            if self.is_live(id, &handle).await {
                return Ok(guard);
            }
        }
    }

    async fn is_live(&self, id: &SessionId, handle: &SessionHandle) -> bool {
        self.sessions
            .lock()
            .await
            .get(id)
            .is_some_and(|live| Arc::ptr_eq(live, handle))
    }

    async fn handle(&self, id: &SessionId) -> Result<SessionHandle, OrchestrationError> {
        if let Some(handle) = self.sessions.lock().await.get(id) {
            return Ok(handle.clone());
        }

        let state = self
            .store
            .load_snapshot(id)
            .await?
            .ok_or(OrchestrationError::SessionNotFound(*id))?;
        info!(
            session = %id,
            participants = state.participants.len(),
            transactions = state.transactions.len(),
            "session loaded from store"
        );
        // Another caller may have loaded the same session in the meantime.
        let handle = self
            .sessions
            .lock()
            .await
            .entry(*id)
            .or_insert_with(|| Arc::new(Mutex::new(state)))
            .clone();
        Ok(handle)
    }
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
