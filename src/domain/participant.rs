//! Session participant and its derived balance.

use crate::domain::{Decimal, ParticipantId};
use serde::{Deserialize, Serialize};

/// A person holding chips in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    /// Name as entered; may be empty. See [`Participant::display_name`].
    pub name: String,
    /// Cumulative contribution, never decreases.
    pub money_put_in: Decimal,
    /// Cumulative amount returned, never decreases.
    pub money_returned: Decimal,
    /// Chips held. May go negative when a participant returns more than they hold.
    pub chip_count: i64,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            money_put_in: Decimal::zero(),
            money_returned: Decimal::zero(),
            chip_count: 0,
        }
    }

    /// `money_returned - money_put_in`: positive is a net winner, negative a net contributor.
    pub fn balance(&self) -> Decimal {
        self.money_returned - self.money_put_in
    }

    /// Contribution still sitting in the pot.
    pub fn in_pot(&self) -> Decimal {
        self.money_put_in - self.money_returned
    }

    /// The entered name, or `Person {ordinal}` (1-based) when it is blank.
    pub fn display_name(&self, ordinal: usize) -> String {
        placeholder_or(&self.name, ordinal)
    }
}

pub(crate) fn placeholder_or(name: &str, ordinal: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("Person {}", ordinal)
    } else {
        trimmed.to_string()
    }
}
