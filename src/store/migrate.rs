//! Versioned snapshot loader.
//!
//! Every stored record passes through [`migrate`] once, at load time, before
//! any ledger operation sees it. Version 1 records (no `version` field) come
//! from the browser-era tracker and may carry:
//! - `initialMoney` / `totalMoney` instead of `moneyPutIn`, and no `moneyReturned`
//! - timestamps as ISO-8601 strings, epoch millis, or `{seconds, nanoseconds}` instants
//! - string or missing ids
//!
//! [`to_record`] always writes the current version with ISO-8601 timestamps and
//! money as decimal strings, so reloading reproduces every stored digit.

use crate::domain::decimal::as_str;
use crate::domain::{
    ChipValueMode, ColorValues, Decimal, Participant, ParticipantId, SessionConfig, SessionState,
    Timestamp, Transaction, TransactionId, TransactionKind,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Schema version written by [`to_record`].
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrateError {
    #[error("snapshot is not a JSON object")]
    NotAnObject,
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("malformed snapshot: {0}")]
    Malformed(String),
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("transaction {index} is missing a participant id")]
    MissingParticipantId { index: usize },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSession {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default, alias = "configuration", alias = "settings")]
    config: Option<RawConfig>,
    #[serde(default, alias = "people")]
    participants: Vec<RawParticipant>,
    #[serde(default)]
    transactions: Vec<RawTransaction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default, alias = "chipToValueMode", alias = "chipMode")]
    chip_value_mode: Option<String>,
    #[serde(default, alias = "stackValue")]
    stack_unit_value: Option<RawNumber>,
    #[serde(default)]
    chips_per_stack: Option<RawNumber>,
    #[serde(default, alias = "perColorChipValues", alias = "chipValues")]
    color_values: Option<RawColorValues>,
}

#[derive(Debug, Default, Deserialize)]
struct RawColorValues {
    black: Option<RawNumber>,
    white: Option<RawNumber>,
    green: Option<RawNumber>,
    red: Option<RawNumber>,
    blue: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParticipant {
    #[serde(default)]
    id: Option<RawNumber>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    money_put_in: Option<RawNumber>,
    #[serde(default)]
    money_returned: Option<RawNumber>,
    #[serde(default)]
    initial_money: Option<RawNumber>,
    #[serde(default)]
    total_money: Option<RawNumber>,
    #[serde(default, alias = "chips")]
    chip_count: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(default)]
    id: Option<RawNumber>,
    #[serde(default, alias = "personId")]
    participant_id: Option<RawNumber>,
    #[serde(default)]
    person_name: Option<String>,
    #[serde(default)]
    amount: Option<RawNumber>,
    #[serde(default)]
    chips: Option<RawNumber>,
    #[serde(default, alias = "type")]
    kind: Option<String>,
    #[serde(default, alias = "time", alias = "date")]
    timestamp: Option<RawTimestamp>,
}

/// A number that may arrive as an integer, a float, or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    fn to_decimal(&self, field: &'static str) -> Result<Decimal, MigrateError> {
        let invalid = || MigrateError::InvalidValue {
            field,
            value: format!("{:?}", self),
        };
        match self {
            RawNumber::Int(i) => Ok(Decimal::from_i64(*i)),
            RawNumber::Float(f) => Decimal::from_f64(*f).ok_or_else(invalid),
            RawNumber::Text(s) => Decimal::from_str_canonical(s.trim()).map_err(|_| invalid()),
        }
    }

    fn to_i64(&self, field: &'static str) -> Result<i64, MigrateError> {
        self.to_decimal(field)?
            .round_half_up()
            .ok_or_else(|| MigrateError::InvalidValue {
                field,
                value: format!("{:?}", self),
            })
    }

    fn to_u64(&self, field: &'static str) -> Result<u64, MigrateError> {
        let value = self.to_i64(field)?;
        u64::try_from(value).map_err(|_| MigrateError::InvalidValue {
            field,
            value: value.to_string(),
        })
    }
}

/// Timestamp in any of the shapes legacy clients wrote.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    FloatMillis(f64),
    Text(String),
    Instant {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds", alias = "nanos")]
        nanoseconds: u32,
    },
}

impl RawTimestamp {
    fn normalize(&self) -> Option<Timestamp> {
        match self {
            RawTimestamp::Millis(ms) => Timestamp::from_millis(*ms),
            RawTimestamp::FloatMillis(ms) if ms.is_finite() => {
                Timestamp::from_millis(ms.round() as i64)
            }
            RawTimestamp::FloatMillis(_) => None,
            RawTimestamp::Text(s) => Timestamp::parse_iso(s)
                .or_else(|| s.trim().parse::<i64>().ok().and_then(Timestamp::from_millis)),
            RawTimestamp::Instant {
                seconds,
                nanoseconds,
            } => Timestamp::from_parts(*seconds, *nanoseconds),
        }
    }
}

/// Normalize a stored record of any supported version into current-schema state.
pub fn migrate(record: Value) -> Result<SessionState, MigrateError> {
    if !record.is_object() {
        return Err(MigrateError::NotAnObject);
    }
    let raw: RawSession =
        serde_json::from_value(record).map_err(|e| MigrateError::Malformed(e.to_string()))?;

    let version = raw.version.unwrap_or(1);
    if version > SCHEMA_VERSION {
        return Err(MigrateError::UnsupportedVersion(version));
    }
    if version < SCHEMA_VERSION {
        debug!(version, "migrating legacy snapshot");
    }

    let config = migrate_config(raw.config.unwrap_or_default())?;
    let participants = migrate_participants(raw.participants)?;
    let mut state = SessionState {
        config,
        participants,
        transactions: Vec::new(),
    };
    if !state.totals_fit() {
        return Err(MigrateError::InvalidValue {
            field: "participants",
            value: "session totals out of range".to_string(),
        });
    }
    state.transactions = migrate_transactions(raw.transactions, &state)?;
    Ok(state)
}

fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, MigrateError> {
    if value.is_negative() {
        return Err(MigrateError::InvalidValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn migrate_config(raw: RawConfig) -> Result<SessionConfig, MigrateError> {
    let defaults = SessionConfig::default();
    let chip_value_mode = match raw.chip_value_mode.as_deref().map(str::trim) {
        None | Some("") => defaults.chip_value_mode,
        Some(mode) => match mode.to_ascii_lowercase().as_str() {
            "uniform" | "single" => ChipValueMode::Uniform,
            "percolor" | "per_color" | "per-color" | "color" | "colors" => {
                ChipValueMode::PerColor
            }
            _ => {
                return Err(MigrateError::InvalidValue {
                    field: "chipValueMode",
                    value: mode.to_string(),
                })
            }
        },
    };

    let stack_unit_value = match raw.stack_unit_value {
        Some(n) => non_negative("stackUnitValue", n.to_decimal("stackUnitValue")?)?,
        None => defaults.stack_unit_value,
    };
    let chips_per_stack = match raw.chips_per_stack {
        Some(n) => n.to_i64("chipsPerStack")?,
        None => defaults.chips_per_stack,
    };
    if chips_per_stack < 0 {
        return Err(MigrateError::InvalidValue {
            field: "chipsPerStack",
            value: chips_per_stack.to_string(),
        });
    }

    let mut color_values = ColorValues::default();
    if let Some(raw_colors) = raw.color_values {
        let slots = [
            (raw_colors.black, &mut color_values.black),
            (raw_colors.white, &mut color_values.white),
            (raw_colors.green, &mut color_values.green),
            (raw_colors.red, &mut color_values.red),
            (raw_colors.blue, &mut color_values.blue),
        ];
        for (raw_value, slot) in slots {
            if let Some(n) = raw_value {
                *slot = non_negative("colorValues", n.to_decimal("colorValues")?)?;
            }
        }
    }

    Ok(SessionConfig {
        chip_value_mode,
        stack_unit_value,
        chips_per_stack,
        color_values,
    })
}

fn migrate_participants(raw: Vec<RawParticipant>) -> Result<Vec<Participant>, MigrateError> {
    let mut explicit_ids = Vec::with_capacity(raw.len());
    for p in &raw {
        explicit_ids.push(match &p.id {
            Some(id) => Some(id.to_u64("participant id")?),
            None => None,
        });
    }
    let id_overflow = || MigrateError::InvalidValue {
        field: "participant id",
        value: u64::MAX.to_string(),
    };
    let mut next_free = explicit_ids
        .iter()
        .flatten()
        .map(|id| id.checked_add(1).ok_or_else(id_overflow))
        .try_fold(0u64, |max, next| next.map(|n| max.max(n)))?;
    let mut seen = HashSet::new();

    let mut participants = Vec::with_capacity(raw.len());
    for (p, explicit) in raw.into_iter().zip(explicit_ids) {
        let id = match explicit {
            Some(id) if seen.insert(id) => id,
            _ => {
                let id = next_free;
                next_free = next_free.checked_add(1).ok_or_else(id_overflow)?;
                seen.insert(id);
                id
            }
        };

        let money_put_in = match p
            .money_put_in
            .as_ref()
            .or(p.initial_money.as_ref())
            .or(p.total_money.as_ref())
        {
            Some(n) => n.to_decimal("moneyPutIn")?,
            None => Decimal::zero(),
        };
        if p.money_put_in.is_none() {
            warn!(participant = id, "participant record missing moneyPutIn");
        }
        let money_returned = match &p.money_returned {
            Some(n) => n.to_decimal("moneyReturned")?,
            None => Decimal::zero(),
        };
        let money_put_in = non_negative("moneyPutIn", money_put_in)?;
        let money_returned = non_negative("moneyReturned", money_returned)?;
        let chip_count = match &p.chip_count {
            Some(n) => n.to_i64("chipCount")?,
            None => 0,
        };

        participants.push(Participant {
            id: ParticipantId::new(id),
            name: p.name.unwrap_or_default().trim().to_string(),
            money_put_in,
            money_returned,
            chip_count,
        });
    }
    Ok(participants)
}

fn parse_kind(kind: &str) -> Option<TransactionKind> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "contribution" | "buyin" | "buy-in" | "add" | "deposit" => {
            Some(TransactionKind::Contribution)
        }
        "return" | "cashout" | "cash-out" | "remove" | "withdrawal" => {
            Some(TransactionKind::Return)
        }
        _ => None,
    }
}

fn migrate_transactions(
    raw: Vec<RawTransaction>,
    state: &SessionState,
) -> Result<Vec<Transaction>, MigrateError> {
    let epoch = Timestamp::from_millis(0).unwrap_or_else(Timestamp::now);
    let mut transactions = Vec::with_capacity(raw.len());
    let mut seen_ids = HashSet::new();
    let mut pending_ids = Vec::new();

    for (index, t) in raw.into_iter().enumerate() {
        let participant_id = t
            .participant_id
            .as_ref()
            .ok_or(MigrateError::MissingParticipantId { index })?
            .to_u64("participantId")
            .map(ParticipantId::new)?;

        let signed_amount = match &t.amount {
            Some(n) => n.to_decimal("amount")?,
            None => Decimal::zero(),
        };
        let kind = match t.kind.as_deref() {
            Some(kind) => parse_kind(kind).ok_or_else(|| MigrateError::InvalidValue {
                field: "kind",
                value: kind.to_string(),
            })?,
            None if signed_amount.is_negative() => TransactionKind::Return,
            None => TransactionKind::Contribution,
        };
        let chips = match &t.chips {
            Some(n) => n
                .to_i64("chips")?
                .checked_abs()
                .ok_or_else(|| MigrateError::InvalidValue {
                    field: "chips",
                    value: format!("{:?}", n),
                })?,
            None => 0,
        };

        let timestamp = match &t.timestamp {
            Some(raw_ts) => raw_ts.normalize().ok_or_else(|| MigrateError::InvalidValue {
                field: "timestamp",
                value: format!("{:?}", raw_ts),
            })?,
            None => {
                warn!(index, "transaction record missing timestamp, using epoch");
                epoch
            }
        };

        let person_name = match t.person_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => state.display_name(participant_id).unwrap_or_default(),
        };

        let id = match &t.id {
            Some(id) => {
                let id = id.to_u64("transaction id")?;
                if seen_ids.insert(id) {
                    Some(TransactionId::new(id))
                } else {
                    None
                }
            }
            None => None,
        };
        if id.is_none() {
            pending_ids.push(index);
        }

        transactions.push(Transaction {
            id: id.unwrap_or_default(),
            participant_id,
            person_name,
            amount: signed_amount.abs(),
            chips,
            kind,
            timestamp,
        });
    }

    if !pending_ids.is_empty() {
        let mut next = transactions
            .iter()
            .enumerate()
            .filter(|(idx, _)| !pending_ids.contains(idx))
            .map(|(_, t)| t.id)
            .max()
            .map(|id| id.0.checked_add(1).map(TransactionId::new))
            .unwrap_or(Some(TransactionId::new(1)));
        for idx in pending_ids {
            let id = next.ok_or_else(|| MigrateError::InvalidValue {
                field: "transaction id",
                value: u64::MAX.to_string(),
            })?;
            if let Some(tx) = transactions.get_mut(idx) {
                tx.id = id;
            }
            next = id.0.checked_add(1).map(TransactionId::new);
        }
    }

    Ok(transactions)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession<'a> {
    version: u32,
    config: StoredConfig,
    participants: Vec<StoredParticipant<'a>>,
    transactions: Vec<StoredTransaction<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfig {
    chip_value_mode: ChipValueMode,
    #[serde(with = "as_str")]
    stack_unit_value: Decimal,
    chips_per_stack: i64,
    color_values: StoredColorValues,
}

#[derive(Serialize)]
struct StoredColorValues {
    #[serde(with = "as_str")]
    black: Decimal,
    #[serde(with = "as_str")]
    white: Decimal,
    #[serde(with = "as_str")]
    green: Decimal,
    #[serde(with = "as_str")]
    red: Decimal,
    #[serde(with = "as_str")]
    blue: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredParticipant<'a> {
    id: ParticipantId,
    name: &'a str,
    #[serde(with = "as_str")]
    money_put_in: Decimal,
    #[serde(with = "as_str")]
    money_returned: Decimal,
    chip_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredTransaction<'a> {
    id: TransactionId,
    participant_id: ParticipantId,
    person_name: &'a str,
    #[serde(with = "as_str")]
    amount: Decimal,
    chips: i64,
    kind: TransactionKind,
    timestamp: Timestamp,
}

impl<'a> From<&'a SessionState> for StoredSession<'a> {
    fn from(state: &'a SessionState) -> Self {
        let config = &state.config;
        let colors = &config.color_values;
        StoredSession {
            version: SCHEMA_VERSION,
            config: StoredConfig {
                chip_value_mode: config.chip_value_mode,
                stack_unit_value: config.stack_unit_value,
                chips_per_stack: config.chips_per_stack,
                color_values: StoredColorValues {
                    black: colors.black,
                    white: colors.white,
                    green: colors.green,
                    red: colors.red,
                    blue: colors.blue,
                },
            },
            participants: state
                .participants
                .iter()
                .map(|p| StoredParticipant {
                    id: p.id,
                    name: &p.name,
                    money_put_in: p.money_put_in,
                    money_returned: p.money_returned,
                    chip_count: p.chip_count,
                })
                .collect(),
            transactions: state
                .transactions
                .iter()
                .map(|t| StoredTransaction {
                    id: t.id,
                    participant_id: t.participant_id,
                    person_name: &t.person_name,
                    amount: t.amount,
                    chips: t.chips,
                    kind: t.kind,
                    timestamp: t.timestamp,
                })
                .collect(),
        }
    }
}

/// Encode state as a current-version record.
pub fn to_record(state: &SessionState) -> Result<Value, serde_json::Error> {
    serde_json::to_value(StoredSession::from(state))
}
