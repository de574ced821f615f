use crate::domain::{
    ChipBreakdown, ChipValueMode, Decimal, Participant, ParticipantId, SessionState, Timestamp,
    Transaction, TransactionKind,
};
use thiserror::Error;
use tracing::{debug, warn};

use super::{chip_total_warning, views, ParticipantView, Warning};

/// Capability granted to the caller that opened the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Edit,
    ViewOnly,
}

impl Access {
    pub fn can_edit(&self) -> bool {
        matches!(self, Access::Edit)
    }
}

/// What a participant adds to the pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionInput {
    /// Uniform mode: a (possibly fractional) number of stacks.
    Stacks(Decimal),
    /// PerColor mode: chips handed over per color.
    Breakdown(ChipBreakdown),
}

/// What a participant takes back out of the pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnInput {
    /// Uniform mode: number of chips cashed in.
    Count(i64),
    /// PerColor mode: chips cashed in per color.
    Breakdown(ChipBreakdown),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("session is view-only for this caller")]
    ReadOnly,
    #[error("unknown participant: {0}")]
    UnknownParticipant(ParticipantId),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("contribution moves neither money nor chips")]
    ZeroContribution,
    #[error("a return must include at least one chip")]
    ZeroReturn,
    #[error("{input} input is not accepted in {mode:?} mode")]
    ModeMismatch {
        mode: ChipValueMode,
        input: &'static str,
    },
    #[error("amount out of range")]
    Overflow,
}

/// Signal returned by every mutating ledger operation.
///
/// The caller decides whether and when to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Post-mutation copy of the affected participant.
    pub participant: Option<Participant>,
    /// Log entry appended by the operation, if any.
    pub transaction: Option<Transaction>,
    pub warnings: Vec<Warning>,
}

/// Priced money/chip movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Movement {
    amount: Decimal,
    chips: i64,
}

/// Mutation handle over a caller-owned session.
///
/// All state changes go through this type; each runs to completion and either
/// applies fully or leaves the session untouched.
pub struct Ledger<'a> {
    state: &'a mut SessionState,
    access: Access,
    clock: fn() -> Timestamp,
}

impl<'a> Ledger<'a> {
    pub fn new(state: &'a mut SessionState, access: Access) -> Self {
        Self {
            state,
            access,
            clock: Timestamp::now,
        }
    }

    /// Replace the clock used to timestamp new transactions.
    pub fn with_clock(mut self, clock: fn() -> Timestamp) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &SessionState {
        self.state
    }

    /// Add a participant with an initial contribution (may be zero).
    pub fn add_participant(
        &mut self,
        name: &str,
        initial_contribution: Decimal,
    ) -> Result<StateChange, LedgerError> {
        self.ensure_editable()?;
        if initial_contribution.is_negative() {
            return Err(LedgerError::InvalidAmount(format!(
                "initial contribution must be non-negative, got {}",
                initial_contribution
            )));
        }

        let id = self.state.next_participant_id();
        if self.state.participant(id).is_some() {
            return Err(LedgerError::Overflow);
        }
        let chips = self
            .state
            .config
            .chips_for_amount(initial_contribution)
            .ok_or(LedgerError::Overflow)?;
        let mut participant = Participant::new(id, name.trim());
        participant.money_put_in = initial_contribution;
        participant.chip_count = chips;
        let participant = self.commit(participant)?;

        let transaction = if initial_contribution.is_positive() {
            Some(self.append(
                id,
                Movement {
                    amount: initial_contribution,
                    chips,
                },
                TransactionKind::Contribution,
            ))
        } else {
            None
        };

        debug!(
            participant = %id,
            amount = %initial_contribution,
            chips,
            "participant added"
        );
        Ok(self.change(Some(participant), transaction))
    }

    /// Add money and chips for a participant.
    pub fn record_contribution(
        &mut self,
        participant_id: ParticipantId,
        input: ContributionInput,
    ) -> Result<StateChange, LedgerError> {
        self.ensure_editable()?;
        self.require_participant(participant_id)?;
        let movement = self.price_contribution(input)?;
        if movement.amount.is_zero() && movement.chips == 0 {
            return Err(LedgerError::ZeroContribution);
        }

        let mut participant = self.participant_copy(participant_id)?;
        participant.money_put_in = participant
            .money_put_in
            .checked_add(movement.amount)
            .ok_or(LedgerError::Overflow)?;
        participant.chip_count = participant
            .chip_count
            .checked_add(movement.chips)
            .ok_or(LedgerError::Overflow)?;
        let participant = self.commit(participant)?;

        let transaction =
            self.append(participant_id, movement, TransactionKind::Contribution);
        debug!(
            participant = %participant_id,
            amount = %movement.amount,
            chips = movement.chips,
            "contribution recorded"
        );
        Ok(self.change(Some(participant), Some(transaction)))
    }

    /// Cash chips back out for a participant. The chip count may go negative.
    pub fn record_return(
        &mut self,
        participant_id: ParticipantId,
        input: ReturnInput,
    ) -> Result<StateChange, LedgerError> {
        self.ensure_editable()?;
        self.require_participant(participant_id)?;
        let movement = self.price_return(input)?;
        if movement.chips <= 0 {
            return Err(LedgerError::ZeroReturn);
        }

        let mut participant = self.participant_copy(participant_id)?;
        participant.money_returned = participant
            .money_returned
            .checked_add(movement.amount)
            .ok_or(LedgerError::Overflow)?;
        participant.chip_count = participant
            .chip_count
            .checked_sub(movement.chips)
            .ok_or(LedgerError::Overflow)?;
        let participant = self.commit(participant)?;

        let transaction = self.append(participant_id, movement, TransactionKind::Return);
        debug!(
            participant = %participant_id,
            amount = %movement.amount,
            chips = movement.chips,
            "return recorded"
        );
        Ok(self.change(Some(participant), Some(transaction)))
    }

    /// Rename a participant and relabel every historical transaction for that id.
    ///
    /// This rewrites denormalized display names in the log; amounts, kinds and
    /// ordering are never touched.
    pub fn rename_participant(
        &mut self,
        participant_id: ParticipantId,
        new_name: &str,
    ) -> Result<StateChange, LedgerError> {
        self.ensure_editable()?;
        let participant = self.participant_mut(participant_id)?;
        participant.name = new_name.trim().to_string();
        let participant = participant.clone();

        let resolved = self
            .state
            .display_name(participant_id)
            .ok_or(LedgerError::UnknownParticipant(participant_id))?;
        let mut relabeled = 0usize;
        for tx in self
            .state
            .transactions
            .iter_mut()
            .filter(|tx| tx.participant_id == participant_id)
        {
            tx.person_name = resolved.clone();
            relabeled += 1;
        }

        debug!(participant = %participant_id, relabeled, "participant renamed");
        Ok(self.change(Some(participant), None))
    }

    /// Drop all participants and history, keeping the configuration.
    pub fn reset(&mut self) -> Result<StateChange, LedgerError> {
        self.ensure_editable()?;
        self.state.participants.clear();
        self.state.transactions.clear();
        debug!("session reset");
        Ok(self.change(None, None))
    }

    pub fn total_pot(&self) -> Decimal {
        self.state.total_pot()
    }

    pub fn total_chips(&self) -> i64 {
        self.state.total_chips()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        chip_total_warning(self.state.total_chips())
            .into_iter()
            .collect()
    }

    pub fn uniform_chip_value(&self) -> Decimal {
        self.state.config.uniform_chip_value()
    }

    pub fn per_color_chip_values(&self) -> &crate::domain::ColorValues {
        self.state.config.per_color_chip_values()
    }

    pub fn participants(&self) -> Vec<ParticipantView> {
        views::participant_views(self.state)
    }

    /// Most-recent-first view of the log.
    pub fn transaction_log(&self) -> Vec<&Transaction> {
        views::transaction_log(self.state)
    }

    fn ensure_editable(&self) -> Result<(), LedgerError> {
        if self.access.can_edit() {
            Ok(())
        } else {
            Err(LedgerError::ReadOnly)
        }
    }

    fn require_participant(&self, id: ParticipantId) -> Result<(), LedgerError> {
        self.state
            .participant(id)
            .map(|_| ())
            .ok_or(LedgerError::UnknownParticipant(id))
    }

    fn participant_mut(&mut self, id: ParticipantId) -> Result<&mut Participant, LedgerError> {
        self.state
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LedgerError::UnknownParticipant(id))
    }

    fn participant_copy(&self, id: ParticipantId) -> Result<Participant, LedgerError> {
        self.state
            .participant(id)
            .cloned()
            .ok_or(LedgerError::UnknownParticipant(id))
    }

    /// Store `updated` over the participant with the same id, or add it as new.
    ///
    /// Fails with [`LedgerError::Overflow`] and restores the previous roster when
    /// a session total would no longer be representable.
    fn commit(&mut self, updated: Participant) -> Result<Participant, LedgerError> {
        let slot = self
            .state
            .participants
            .iter()
            .position(|p| p.id == updated.id);
        match slot {
            Some(idx) => {
                let previous =
                    std::mem::replace(&mut self.state.participants[idx], updated.clone());
                if !self.state.totals_fit() {
                    self.state.participants[idx] = previous;
                    return Err(LedgerError::Overflow);
                }
            }
            None => {
                self.state.participants.push(updated.clone());
                if !self.state.totals_fit() {
                    self.state.participants.pop();
                    return Err(LedgerError::Overflow);
                }
            }
        }
        Ok(updated)
    }

    fn price_contribution(&self, input: ContributionInput) -> Result<Movement, LedgerError> {
        let config = &self.state.config;
        match (config.chip_value_mode, input) {
            (ChipValueMode::Uniform, ContributionInput::Stacks(stacks)) => {
                if stacks.is_negative() {
                    return Err(LedgerError::InvalidAmount(format!(
                        "stack count must be non-negative, got {}",
                        stacks
                    )));
                }
                let amount = stacks
                    .checked_mul(config.stack_unit_value)
                    .ok_or(LedgerError::Overflow)?;
                let chips = stacks
                    .checked_mul(Decimal::from_i64(config.chips_per_stack))
                    .and_then(|chips| chips.round_half_up())
                    .ok_or(LedgerError::Overflow)?;
                Ok(Movement { amount, chips })
            }
            (ChipValueMode::PerColor, ContributionInput::Breakdown(breakdown)) => Ok(Movement {
                amount: breakdown
                    .value(&config.color_values)
                    .ok_or(LedgerError::Overflow)?,
                chips: breakdown.total_chips(),
            }),
            (mode, ContributionInput::Stacks(_)) => Err(LedgerError::ModeMismatch {
                mode,
                input: "stack",
            }),
            (mode, ContributionInput::Breakdown(_)) => Err(LedgerError::ModeMismatch {
                mode,
                input: "per-color",
            }),
        }
    }

    fn price_return(&self, input: ReturnInput) -> Result<Movement, LedgerError> {
        let config = &self.state.config;
        match (config.chip_value_mode, input) {
            (ChipValueMode::Uniform, ReturnInput::Count(chips)) => {
                if chips < 0 {
                    return Err(LedgerError::InvalidAmount(format!(
                        "chip count must be non-negative, got {}",
                        chips
                    )));
                }
                let amount = Decimal::from_i64(chips)
                    .checked_mul(config.uniform_chip_value())
                    .ok_or(LedgerError::Overflow)?;
                Ok(Movement { amount, chips })
            }
            (ChipValueMode::PerColor, ReturnInput::Breakdown(breakdown)) => Ok(Movement {
                amount: breakdown
                    .value(&config.color_values)
                    .ok_or(LedgerError::Overflow)?,
                chips: breakdown.total_chips(),
            }),
            (mode, ReturnInput::Count(_)) => Err(LedgerError::ModeMismatch {
                mode,
                input: "chip count",
            }),
            (mode, ReturnInput::Breakdown(_)) => Err(LedgerError::ModeMismatch {
                mode,
                input: "per-color",
            }),
        }
    }

    fn append(
        &mut self,
        participant_id: ParticipantId,
        movement: Movement,
        kind: TransactionKind,
    ) -> Transaction {
        let person_name = self
            .state
            .display_name(participant_id)
            .unwrap_or_default();
        let transaction = Transaction {
            id: self.state.next_transaction_id(),
            participant_id,
            person_name,
            amount: movement.amount,
            chips: movement.chips,
            kind,
            timestamp: (self.clock)(),
        };
        self.state.transactions.push(transaction.clone());
        transaction
    }

    fn change(
        &self,
        participant: Option<Participant>,
        transaction: Option<Transaction>,
    ) -> StateChange {
        let warnings = self.warnings();
        for warning in &warnings {
            warn!("{}", warning);
        }
        StateChange {
            participant,
            transaction,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChipColor, ColorValues, SessionConfig};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn fixed_clock() -> Timestamp {
        Timestamp::from_millis(1_000).unwrap()
    }

    #[test]
    fn test_add_participant_assigns_sequential_ids() {
        let mut state = SessionState::new(SessionConfig::uniform(d("100"), 100));
        let mut ledger = Ledger::new(&mut state, Access::Edit).with_clock(fixed_clock);

        let a = ledger.add_participant("A", d("100")).unwrap();
        let b = ledger.add_participant("", Decimal::zero()).unwrap();

        let a = a.participant.unwrap();
        let b_participant = b.participant.unwrap();
        assert_eq!(a.id, ParticipantId::new(0));
        assert_eq!(a.chip_count, 100);
        assert_eq!(b_participant.id, ParticipantId::new(1));
        assert!(b.transaction.is_none());
        assert_eq!(ledger.state().transactions.len(), 1);
    }

    #[test]
    fn test_initial_contribution_uses_placeholder_name() {
        let mut state = SessionState::default();
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        ledger.add_participant("Ann", d("20")).unwrap();
        let change = ledger.add_participant("", d("20")).unwrap();
        assert_eq!(change.transaction.unwrap().person_name, "Person 2");
        // The placeholder is never stored as the participant's name.
        assert_eq!(change.participant.unwrap().name, "");
    }

    #[test]
    fn test_negative_initial_contribution_rejected() {
        let mut state = SessionState::default();
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let err = ledger.add_participant("A", d("-1")).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        assert!(ledger.state().participants.is_empty());
    }

    #[test]
    fn test_half_stack_contribution() {
        let mut state = SessionState::new(SessionConfig::uniform(d("20"), 20));
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger
            .add_participant("A", Decimal::zero())
            .unwrap()
            .participant
            .unwrap()
            .id;

        let change = ledger
            .record_contribution(id, ContributionInput::Stacks(d("0.5")))
            .unwrap();
        let p = change.participant.unwrap();
        assert_eq!(p.chip_count, 10);
        assert_eq!(p.money_put_in, d("10"));
        let tx = change.transaction.unwrap();
        assert_eq!(tx.amount, d("10"));
        assert_eq!(tx.kind, TransactionKind::Contribution);
    }

    #[test]
    fn test_zero_contribution_is_rejected_without_side_effects() {
        let mut state = SessionState::default();
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger
            .add_participant("A", d("20"))
            .unwrap()
            .participant
            .unwrap()
            .id;
        let before = ledger.state().clone();

        let err = ledger
            .record_contribution(id, ContributionInput::Stacks(Decimal::zero()))
            .unwrap_err();
        assert_eq!(err, LedgerError::ZeroContribution);
        assert_eq!(ledger.state(), &before);
    }

    #[test]
    fn test_return_requires_chips() {
        let mut state = SessionState::default();
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger
            .add_participant("A", d("20"))
            .unwrap()
            .participant
            .unwrap()
            .id;
        assert_eq!(
            ledger.record_return(id, ReturnInput::Count(0)).unwrap_err(),
            LedgerError::ZeroReturn
        );
        assert!(matches!(
            ledger.record_return(id, ReturnInput::Count(-4)).unwrap_err(),
            LedgerError::InvalidAmount(_)
        ));
    }

    #[test]
    fn test_unknown_participant() {
        let mut state = SessionState::default();
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let missing = ParticipantId::new(42);
        assert_eq!(
            ledger
                .record_contribution(missing, ContributionInput::Stacks(d("1")))
                .unwrap_err(),
            LedgerError::UnknownParticipant(missing)
        );
        assert_eq!(
            ledger.rename_participant(missing, "X").unwrap_err(),
            LedgerError::UnknownParticipant(missing)
        );
    }

    #[test]
    fn test_mode_mismatch() {
        let mut state = SessionState::new(SessionConfig::per_color(ColorValues::default()));
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger
            .add_participant("A", Decimal::zero())
            .unwrap()
            .participant
            .unwrap()
            .id;
        assert!(matches!(
            ledger
                .record_contribution(id, ContributionInput::Stacks(d("1")))
                .unwrap_err(),
            LedgerError::ModeMismatch { .. }
        ));
        assert!(matches!(
            ledger.record_return(id, ReturnInput::Count(3)).unwrap_err(),
            LedgerError::ModeMismatch { .. }
        ));
    }

    #[test]
    fn test_per_color_contribution_and_return() {
        let mut state = SessionState::new(SessionConfig::per_color(ColorValues::default()));
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger
            .add_participant("A", Decimal::zero())
            .unwrap()
            .participant
            .unwrap()
            .id;

        let buy_in = ChipBreakdown::default()
            .with(ChipColor::White, 10)
            .with(ChipColor::Red, 2);
        ledger
            .record_contribution(id, ContributionInput::Breakdown(buy_in))
            .unwrap();
        let cash_out = ChipBreakdown::default().with(ChipColor::Green, 1);
        let change = ledger
            .record_return(id, ReturnInput::Breakdown(cash_out))
            .unwrap();

        let p = change.participant.unwrap();
        assert_eq!(p.money_put_in, d("20"));
        assert_eq!(p.money_returned, d("25"));
        assert_eq!(p.chip_count, 11);
    }

    #[test]
    fn test_view_only_rejects_every_mutation() {
        let mut state = SessionState::default();
        Ledger::new(&mut state, Access::Edit)
            .add_participant("A", d("20"))
            .unwrap();
        let before = state.clone();

        let mut ledger = Ledger::new(&mut state, Access::ViewOnly);
        let id = ParticipantId::new(0);
        assert_eq!(
            ledger.add_participant("B", d("20")).unwrap_err(),
            LedgerError::ReadOnly
        );
        assert_eq!(
            ledger
                .record_contribution(id, ContributionInput::Stacks(d("1")))
                .unwrap_err(),
            LedgerError::ReadOnly
        );
        assert_eq!(
            ledger.record_return(id, ReturnInput::Count(1)).unwrap_err(),
            LedgerError::ReadOnly
        );
        assert_eq!(
            ledger.rename_participant(id, "Z").unwrap_err(),
            LedgerError::ReadOnly
        );
        assert_eq!(ledger.reset().unwrap_err(), LedgerError::ReadOnly);
        assert_eq!(ledger.total_pot(), d("20"));
        assert_eq!(&state, &before);
    }

    #[test]
    fn test_negative_chip_total_warns_but_succeeds() {
        let mut state = SessionState::default();
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger
            .add_participant("A", d("20"))
            .unwrap()
            .participant
            .unwrap()
            .id;

        let change = ledger.record_return(id, ReturnInput::Count(30)).unwrap();
        assert_eq!(change.participant.unwrap().chip_count, -10);
        assert_eq!(
            change.warnings,
            vec![Warning::NegativeChipTotal { total_chips: -10 }]
        );
        assert_eq!(ledger.total_chips(), -10);
    }

    #[test]
    fn test_reset_keeps_config() {
        let config = SessionConfig::uniform(d("50"), 25);
        let mut state = SessionState::new(config);
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        ledger.add_participant("A", d("50")).unwrap();
        ledger.reset().unwrap();
        assert!(ledger.state().is_empty());
        assert_eq!(ledger.state().config, config);
        assert_eq!(ledger.state().next_participant_id(), ParticipantId::new(0));
    }

    #[test]
    fn test_transaction_ids_are_monotonic() {
        let mut state = SessionState::default();
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        ledger.add_participant("A", d("20")).unwrap();
        ledger
            .record_contribution(ParticipantId::new(0), ContributionInput::Stacks(d("1")))
            .unwrap();
        ledger
            .record_return(ParticipantId::new(0), ReturnInput::Count(5))
            .unwrap();
        let ids: Vec<u64> = ledger.state().transactions.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let log_ids: Vec<u64> = ledger.transaction_log().iter().map(|t| t.id.0).collect();
        assert_eq!(log_ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_contribution_past_decimal_range_is_rejected() {
        let mut state = SessionState::new(SessionConfig::uniform(d("1"), 0));
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger.add_participant("A", Decimal::zero()).unwrap().participant.unwrap().id;
        let huge = ContributionInput::Stacks(d("50000000000000000000000000000"));

        ledger.record_contribution(id, huge).unwrap();
        let before = ledger.state().clone();
        assert_eq!(
            ledger.record_contribution(id, huge).unwrap_err(),
            LedgerError::Overflow
        );
        assert_eq!(ledger.state(), &before);
    }

    #[test]
    fn test_chip_count_past_i64_range_is_rejected() {
        let mut state = SessionState::new(SessionConfig::uniform(d("0"), i64::MAX));
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger.add_participant("A", Decimal::zero()).unwrap().participant.unwrap().id;

        let change = ledger
            .record_contribution(id, ContributionInput::Stacks(d("1")))
            .unwrap();
        assert_eq!(change.participant.unwrap().chip_count, i64::MAX);
        assert_eq!(
            ledger
                .record_contribution(id, ContributionInput::Stacks(d("1")))
                .unwrap_err(),
            LedgerError::Overflow
        );
        assert_eq!(ledger.state().transactions.len(), 1);
        assert_eq!(ledger.total_chips(), i64::MAX);
    }

    #[test]
    fn test_session_total_overflow_rolls_back() {
        let mut state = SessionState::new(SessionConfig::uniform(d("1"), 0));
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let huge = d("50000000000000000000000000000");
        ledger.add_participant("A", huge).unwrap();

        assert_eq!(
            ledger.add_participant("B", huge).unwrap_err(),
            LedgerError::Overflow
        );
        assert_eq!(ledger.state().participants.len(), 1);
        assert_eq!(ledger.state().transactions.len(), 1);
        assert_eq!(ledger.total_pot(), huge);

        let b = ledger.add_participant("B", Decimal::zero()).unwrap().participant.unwrap().id;
        assert_eq!(
            ledger
                .record_contribution(b, ContributionInput::Stacks(huge))
                .unwrap_err(),
            LedgerError::Overflow
        );
        assert!(ledger.state().participant(b).unwrap().money_put_in.is_zero());
    }

    #[test]
    fn test_per_color_value_overflow_is_rejected() {
        let values = ColorValues {
            black: d("50000000000000000000000000000"),
            ..ColorValues::default()
        };
        let mut state = SessionState::new(SessionConfig::per_color(values));
        let mut ledger = Ledger::new(&mut state, Access::Edit);
        let id = ledger.add_participant("A", Decimal::zero()).unwrap().participant.unwrap().id;

        let breakdown = ChipBreakdown::default().with(ChipColor::Black, 2);
        assert_eq!(
            ledger
                .record_contribution(id, ContributionInput::Breakdown(breakdown))
                .unwrap_err(),
            LedgerError::Overflow
        );
        assert!(ledger.state().transactions.is_empty());
    }
}
