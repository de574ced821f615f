//! Domain types for the chip ledger.
//!
//! This module provides:
//! - Lossless money handling via the Decimal wrapper
//! - Domain primitives: Timestamp, ParticipantId, TransactionId, SessionId, TransactionKind
//! - Chip denominations and session configuration
//! - Participant, Transaction and SessionState snapshot types

pub mod chips;
pub mod decimal;
pub mod participant;
pub mod primitives;
pub mod session;
pub mod transaction;

pub use chips::{ChipBreakdown, ChipColor, ChipValueMode, ColorValues, SessionConfig};
pub use decimal::Decimal;
pub use participant::Participant;
pub use primitives::{ParticipantId, SessionId, Timestamp, TransactionId, TransactionKind};
pub use session::SessionState;
pub use transaction::Transaction;
