//! Ledger domain types: the event log and derived balances.

use divvy_shared::types::{ExpenseId, MemberId, Money, SettlementId};
use serde::Serialize;

use crate::expense::Expense;
use crate::settlement::Settlement;

/// An entry in a group's append-only event log.
///
/// The log is the single source of truth: balances are recomputed from
/// it and never trusted from any cached state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEvent {
    /// An expense was recorded.
    Expense(Expense),
    /// A settlement was recorded.
    Settlement(Settlement),
}

impl GroupEvent {
    /// Returns the expense ID if this event is an expense.
    #[must_use]
    pub fn expense_id(&self) -> Option<ExpenseId> {
        match self {
            Self::Expense(expense) => Some(expense.id),
            Self::Settlement(_) => None,
        }
    }

    /// Returns the settlement ID if this event is a settlement.
    #[must_use]
    pub fn settlement_id(&self) -> Option<SettlementId> {
        match self {
            Self::Expense(_) => None,
            Self::Settlement(settlement) => Some(settlement.id),
        }
    }
}

/// The net amount one member currently owes another.
///
/// Directed and strictly positive: at most one of (a, b) / (b, a)
/// appears for any pair, and settled pairs are omitted entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetBalance {
    /// The member who owes.
    pub from: MemberId,
    /// The member who is owed.
    pub to: MemberId,
    /// The amount owed, always positive.
    pub amount: Money,
}
