//! Domain primitives: Timestamp, ParticipantId, TransactionId, SessionId, TransactionKind.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// A UTC instant. Serializes as an ISO-8601 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Timestamp(Utc::now())
    }

    /// Build a Timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(ms: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(ms).single().map(Timestamp)
    }

    /// Build a Timestamp from a seconds/nanoseconds pair.
    pub fn from_parts(seconds: i64, nanos: u32) -> Option<Self> {
        Utc.timestamp_opt(seconds, nanos).single().map(Timestamp)
    }

    /// Parse an ISO-8601 / RFC 3339 string.
    pub fn parse_iso(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| Timestamp(dt.with_timezone(&Utc)))
    }

    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

/// Participant identifier, stable for the lifetime of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl ParticipantId {
    pub fn new(id: u64) -> Self {
        ParticipantId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic transaction identifier within a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl TransactionId {
    pub fn new(id: u64) -> Self {
        TransactionId(id)
    }

    pub fn next(&self) -> Self {
        TransactionId(self.0.saturating_add(1))
    }
}

/// Session identifier (uuid v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(SessionId)
    }
}

/// Direction of a money/chip movement relative to the shared pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money and chips moving from a participant into the pot.
    Contribution,
    /// Chips and money moving back out to a participant.
    Return,
}

impl TransactionKind {
    /// Signed multiplier relative to the pot (+1 for Contribution, -1 for Return).
    pub fn sign(&self) -> i64 {
        match self {
            TransactionKind::Contribution => 1,
            TransactionKind::Return => -1,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Contribution => write!(f, "contribution"),
            TransactionKind::Return => write!(f, "return"),
        }
    }
}
