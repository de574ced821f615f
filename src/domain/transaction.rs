//! Append-only transaction log entry.

use crate::domain::{Decimal, ParticipantId, Timestamp, TransactionId, TransactionKind};
use serde::{Deserialize, Serialize};

/// A single money/chip movement.
///
/// `amount` is always a non-negative magnitude; direction is carried by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub participant_id: ParticipantId,
    /// Display name of the participant, relabeled when the participant is renamed.
    pub person_name: String,
    pub amount: Decimal,
    /// Chips moved; zero for entries migrated from records that did not track chips.
    #[serde(default)]
    pub chips: i64,
    pub kind: TransactionKind,
    pub timestamp: Timestamp,
}

impl Transaction {
    /// Amount signed relative to the pot (contributions positive).
    pub fn signed_amount(&self) -> Decimal {
        Decimal::from_i64(self.kind.sign()) * self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_amount() {
        let tx = Transaction {
            id: TransactionId::new(1),
            participant_id: ParticipantId::new(0),
            person_name: "A".to_string(),
            amount: Decimal::from_i64(40),
            chips: 40,
            kind: TransactionKind::Return,
            timestamp: Timestamp::now(),
        };
        assert_eq!(tx.signed_amount(), Decimal::from_i64(-40));
    }

    #[test]
    fn test_transaction_json_shape() {
        let tx = Transaction {
            id: TransactionId::new(7),
            participant_id: ParticipantId::new(2),
            person_name: "Person 3".to_string(),
            amount: Decimal::from_i64(20),
            chips: 20,
            kind: TransactionKind::Contribution,
            timestamp: Timestamp::from_millis(0).unwrap(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["participantId"], 2);
        assert_eq!(json["personName"], "Person 3");
        assert_eq!(json["kind"], "contribution");
        assert!(json["timestamp"].is_string());
    }
}
