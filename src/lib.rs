pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    ChipBreakdown, ChipColor, ChipValueMode, ColorValues, Decimal, Participant, ParticipantId,
    SessionConfig, SessionId, SessionState, Timestamp, Transaction, TransactionKind,
};
pub use engine::{Access, Ledger, LedgerError};
pub use error::AppError;
pub use orchestration::SessionOrchestrator;
pub use store::{MemorySnapshotStore, SnapshotStore};
