//! Read-only projections handed to the presentation layer.

use crate::domain::{Decimal, ParticipantId, SessionConfig, SessionState, Transaction};
use serde::Serialize;

use super::{chip_total_warning, Warning};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub display_name: String,
    pub money_put_in: Decimal,
    pub money_returned: Decimal,
    pub chip_count: i64,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub config: SessionConfig,
    pub participants: Vec<ParticipantView>,
    pub total_pot: Decimal,
    pub total_chips: i64,
    pub transaction_count: usize,
    pub warnings: Vec<Warning>,
}

pub fn participant_views(state: &SessionState) -> Vec<ParticipantView> {
    state
        .participants
        .iter()
        .enumerate()
        .map(|(idx, p)| ParticipantView {
            id: p.id,
            display_name: p.display_name(idx + 1),
            money_put_in: p.money_put_in,
            money_returned: p.money_returned,
            chip_count: p.chip_count,
            balance: p.balance(),
        })
        .collect()
}

/// Transactions most-recent-first. Stored order stays chronological.
pub fn transaction_log(state: &SessionState) -> Vec<&Transaction> {
    state.transactions.iter().rev().collect()
}

pub fn summarize(state: &SessionState) -> SessionSummary {
    let total_chips = state.total_chips();
    SessionSummary {
        config: state.config,
        participants: participant_views(state),
        total_pot: state.total_pot(),
        total_chips,
        transaction_count: state.transactions.len(),
        warnings: chip_total_warning(total_chips).into_iter().collect(),
    }
}
