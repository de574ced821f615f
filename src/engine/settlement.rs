//! End-of-session settlement reports.
//!
//! Both reports are pure functions of the participant balances in a
//! [`SessionState`] and never mutate it.

use crate::domain::{Decimal, ParticipantId, SessionState};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Warning;

/// Currency-rounding tolerance used by player settlement.
pub const SETTLEMENT_EPSILON: Decimal = Decimal::cent();

/// Which report the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementMode {
    /// A single house holding all buy-ins pays everyone out.
    #[default]
    House,
    /// Losers pay winners directly.
    Players,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseLine {
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub buy_in: Decimal,
    pub balance: Decimal,
    pub house_pays: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseSettlement {
    pub lines: Vec<HouseLine>,
    /// Σ money put in.
    pub total_collected: Decimal,
    /// Σ house payouts. May exceed `total_collected`.
    pub total_paid_out: Decimal,
}

/// House settlement: each participant receives `max(0, money_put_in + balance)`.
pub fn house_settlement(state: &SessionState) -> HouseSettlement {
    let lines: Vec<HouseLine> = state
        .participants
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let balance = p.balance();
            let owed = p.money_put_in + balance;
            HouseLine {
                participant_id: p.id,
                display_name: p.display_name(idx + 1),
                buy_in: p.money_put_in,
                balance,
                house_pays: if owed.is_positive() { owed } else { Decimal::zero() },
            }
        })
        .collect();

    HouseSettlement {
        total_collected: state.participants.iter().map(|p| p.money_put_in).sum(),
        total_paid_out: lines.iter().map(|l| l.house_pays).sum(),
        lines,
    }
}

/// A single transfer from a loser to a winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLine {
    pub to: ParticipantId,
    pub to_name: String,
    pub amount: Decimal,
}

/// All payments made by one loser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerGroup {
    pub payer: ParticipantId,
    pub payer_name: String,
    pub payments: Vec<PaymentLine>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSettlement {
    pub groups: Vec<PayerGroup>,
    pub total_winnings: Decimal,
    pub total_losses: Decimal,
    /// No winners and no losers.
    pub all_even: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<Warning>,
}

impl PlayerSettlement {
    /// Flattened transfers in the order they were matched within each payer.
    pub fn payments(&self) -> Vec<Payment> {
        self.groups
            .iter()
            .flat_map(|g| {
                g.payments.iter().map(move |line| Payment {
                    from: g.payer,
                    to: line.to,
                    amount: line.amount,
                })
            })
            .collect()
    }

    pub fn total_paid(&self) -> Decimal {
        self.groups.iter().map(|g| g.subtotal).sum()
    }

    pub fn transfer_count(&self) -> usize {
        self.groups.iter().map(|g| g.payments.len()).sum()
    }
}

struct Side {
    id: ParticipantId,
    name: String,
    remaining: Decimal,
}

/// Player-to-player settlement by greedy matching.
///
/// Winners and losers are each sorted by magnitude, largest first (ties keep
/// session order), and the largest winner is filled from the largest losers
/// before moving on. This keeps the transfer count low in common cases but is
/// not a guaranteed minimum-transfer solution.
pub fn player_settlement(state: &SessionState) -> PlayerSettlement {
    let mut winners = Vec::new();
    let mut losers = Vec::new();
    for (idx, p) in state.participants.iter().enumerate() {
        let balance = p.balance();
        let side = Side {
            id: p.id,
            name: p.display_name(idx + 1),
            remaining: balance.abs(),
        };
        if balance.is_positive() {
            winners.push(side);
        } else if balance.is_negative() {
            losers.push(side);
        }
    }

    let total_winnings: Decimal = winners.iter().map(|w| w.remaining).sum();
    let total_losses: Decimal = losers.iter().map(|l| l.remaining).sum();
    let all_even = winners.is_empty() && losers.is_empty();

    let warning = ((total_winnings - total_losses).abs() > SETTLEMENT_EPSILON).then(|| {
        let warning = Warning::SettlementMismatch {
            total_winnings,
            total_losses,
        };
        warn!("{}", warning);
        warning
    });

    winners.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    losers.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut groups: Vec<PayerGroup> = Vec::new();
    for winner in winners.iter_mut() {
        for loser in losers.iter_mut() {
            if winner.remaining <= SETTLEMENT_EPSILON {
                break;
            }
            if loser.remaining <= SETTLEMENT_EPSILON {
                continue;
            }
            let payment = winner.remaining.min(loser.remaining);
            winner.remaining -= payment;
            loser.remaining -= payment;

            let line = PaymentLine {
                to: winner.id,
                to_name: winner.name.clone(),
                amount: payment,
            };
            match groups.iter_mut().find(|g| g.payer == loser.id) {
                Some(group) => {
                    group.subtotal += payment;
                    group.payments.push(line);
                }
                None => groups.push(PayerGroup {
                    payer: loser.id,
                    payer_name: loser.name.clone(),
                    payments: vec![line],
                    subtotal: payment,
                }),
            }
        }
    }

    PlayerSettlement {
        groups,
        total_winnings,
        total_losses,
        all_even,
        warning,
    }
}
