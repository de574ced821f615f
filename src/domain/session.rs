//! Session snapshot: configuration, participants and transaction history.

use crate::domain::{Decimal, Participant, ParticipantId, SessionConfig, Transaction, TransactionId};
use serde::{Deserialize, Serialize};

/// Everything a session needs to be rebuilt. Owned by the caller and passed to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub config: SessionConfig,
    pub participants: Vec<Participant>,
    /// Chronological (insertion) order.
    pub transactions: Vec<Transaction>,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            participants: Vec::new(),
            transactions: Vec::new(),
        }
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// 1-based position of the participant in the session.
    pub fn ordinal(&self, id: ParticipantId) -> Option<usize> {
        self.participants
            .iter()
            .position(|p| p.id == id)
            .map(|idx| idx + 1)
    }

    pub fn display_name(&self, id: ParticipantId) -> Option<String> {
        let ordinal = self.ordinal(id)?;
        self.participant(id).map(|p| p.display_name(ordinal))
    }

    /// Max existing id + 1, or 0 for an empty session.
    pub fn next_participant_id(&self) -> ParticipantId {
        self.participants
            .iter()
            .map(|p| p.id.as_u64().saturating_add(1))
            .max()
            .map(ParticipantId::new)
            .unwrap_or_default()
    }

    pub fn next_transaction_id(&self) -> TransactionId {
        self.transactions
            .iter()
            .map(|t| t.id)
            .max()
            .map(|id| id.next())
            .unwrap_or_else(|| TransactionId::new(1))
    }

    /// Σ (money_put_in − money_returned) over all participants.
    pub fn total_pot(&self) -> Decimal {
        self.participants.iter().map(Participant::in_pot).sum()
    }

    /// Σ chip_count over all participants; may be negative.
    ///
    /// Saturates at the i64 range. The ledger refuses mutations that push the
    /// exact sum past it, see [`SessionState::totals_fit`].
    pub fn total_chips(&self) -> i64 {
        let sum: i128 = self.participants.iter().map(|p| i128::from(p.chip_count)).sum();
        i64::try_from(sum).unwrap_or(if sum < 0 { i64::MIN } else { i64::MAX })
    }

    pub fn checked_total_put_in(&self) -> Option<Decimal> {
        self.participants
            .iter()
            .try_fold(Decimal::zero(), |acc, p| acc.checked_add(p.money_put_in))
    }

    pub fn checked_total_returned(&self) -> Option<Decimal> {
        self.participants
            .iter()
            .try_fold(Decimal::zero(), |acc, p| acc.checked_add(p.money_returned))
    }

    pub fn checked_total_chips(&self) -> Option<i64> {
        let sum: i128 = self.participants.iter().map(|p| i128::from(p.chip_count)).sum();
        i64::try_from(sum).ok()
    }

    /// Whether every session-wide total is representable exactly.
    pub fn totals_fit(&self) -> bool {
        self.checked_total_put_in().is_some()
            && self.checked_total_returned().is_some()
            && self.checked_total_chips().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_participant_id() {
        let mut state = SessionState::default();
        assert_eq!(state.next_participant_id(), ParticipantId::new(0));

        state.participants.push(Participant::new(ParticipantId::new(0), "A"));
        state.participants.push(Participant::new(ParticipantId::new(5), "B"));
        assert_eq!(state.next_participant_id(), ParticipantId::new(6));
    }

    #[test]
    fn test_ordinal_and_display_name() {
        let mut state = SessionState::default();
        state.participants.push(Participant::new(ParticipantId::new(4), "Ann"));
        state.participants.push(Participant::new(ParticipantId::new(9), ""));

        assert_eq!(state.ordinal(ParticipantId::new(9)), Some(2));
        assert_eq!(state.display_name(ParticipantId::new(9)).as_deref(), Some("Person 2"));
        assert_eq!(state.display_name(ParticipantId::new(1)), None);
    }

    #[test]
    fn test_totals_fit_detects_overflow() {
        let mut state = SessionState::default();
        let mut a = Participant::new(ParticipantId::new(0), "A");
        a.chip_count = i64::MAX;
        let mut b = Participant::new(ParticipantId::new(1), "B");
        b.chip_count = 1;
        state.participants.push(a);
        assert!(state.totals_fit());

        state.participants.push(b);
        assert!(!state.totals_fit());
        assert_eq!(state.checked_total_chips(), None);
        assert_eq!(state.total_chips(), i64::MAX);
    }

    #[test]
    fn test_next_participant_id_saturates() {
        let mut state = SessionState::default();
        state
            .participants
            .push(Participant::new(ParticipantId::new(u64::MAX), "A"));
        assert_eq!(state.next_participant_id(), ParticipantId::new(u64::MAX));
    }

    #[test]
    fn test_next_transaction_id_starts_at_one() {
        let state = SessionState::default();
        assert_eq!(state.next_transaction_id(), TransactionId::new(1));
    }
}
