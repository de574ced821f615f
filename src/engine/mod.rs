//! Pure computation engine(s) for the session ledger and its settlement.

use crate::domain::Decimal;
use serde::Serialize;

pub mod ledger;
pub mod settlement;
pub mod views;

pub use ledger::{Access, ContributionInput, Ledger, LedgerError, ReturnInput, StateChange};
pub use settlement::{
    house_settlement, player_settlement, HouseLine, HouseSettlement, PayerGroup, Payment,
    PaymentLine, PlayerSettlement, SettlementMode, SETTLEMENT_EPSILON,
};
pub use views::{participant_views, summarize, transaction_log, ParticipantView, SessionSummary};

/// A non-fatal consistency condition surfaced next to otherwise valid results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Warning {
    /// More chips have been returned than were ever handed out.
    #[serde(rename_all = "camelCase")]
    NegativeChipTotal { total_chips: i64 },
    /// Winnings and losses differ by more than the rounding tolerance.
    #[serde(rename_all = "camelCase")]
    SettlementMismatch {
        total_winnings: Decimal,
        total_losses: Decimal,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::NegativeChipTotal { total_chips } => {
                write!(f, "total chip count is negative ({})", total_chips)
            }
            Warning::SettlementMismatch {
                total_winnings,
                total_losses,
            } => write!(
                f,
                "winnings ({}) and losses ({}) do not balance",
                total_winnings, total_losses
            ),
        }
    }
}

/// Chip-total warning for the given grand total, if any.
pub fn chip_total_warning(total_chips: i64) -> Option<Warning> {
    (total_chips < 0).then_some(Warning::NegativeChipTotal { total_chips })
}
