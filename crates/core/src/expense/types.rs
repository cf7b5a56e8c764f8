//! Expense domain types.

use chrono::{DateTime, Utc};
use divvy_shared::types::{ExpenseId, GroupId, MemberId, Money};
use serde::{Deserialize, Serialize};

use crate::split::{Share, SplitMode, SplitSpec};

/// An amount actually paid by a specific member toward an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// The member who paid.
    pub payer: MemberId,
    /// The amount they paid, in cents.
    pub amount: Money,
}

/// Input for creating a new expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// The group this expense belongs to.
    pub group: GroupId,
    /// A description of the expense.
    pub description: String,
    /// The total amount.
    pub total: Money,
    /// The participants sharing this expense, in input order.
    pub participants: Vec<MemberId>,
    /// How the total is divided.
    pub split: SplitSpec,
    /// Who actually paid, and how much each.
    pub contributions: Vec<Contribution>,
}

/// An immutable expense record.
///
/// Constructed only through `ExpenseService::create`, which guarantees
/// `sum(shares) == total == sum(contributions)` cent-exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    /// The expense ID.
    pub id: ExpenseId,
    /// The group this expense belongs to.
    pub group: GroupId,
    /// A description of the expense.
    pub description: String,
    /// The total amount.
    pub total: Money,
    /// When the expense was recorded.
    pub created_at: DateTime<Utc>,
    /// The split mode used to compute the shares.
    pub split_mode: SplitMode,
    /// One share per participant, summing to the total.
    pub shares: Vec<Share>,
    /// Who paid, summing to the total.
    pub contributions: Vec<Contribution>,
}
