//! Greedy debt simplification: fewer payments, same money moved.
//!
//! Advisory only. The pairwise ledger remains the source of truth; the
//! suggestions here are a convenience for "who should pay whom" UIs.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use divvy_shared::types::{MemberId, Money, OverflowError};
use serde::Serialize;

use super::types::NetBalance;
use crate::error::LedgerError;

/// A suggested payment produced by debt simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementSuggestion {
    /// The member who should pay.
    pub from: MemberId,
    /// The member who should receive.
    pub to: MemberId,
    /// The suggested amount.
    pub amount: Money,
}

/// Reduces a balance matrix to a short list of suggested payments.
///
/// Greedy min-cash-flow: repeatedly match the member owed the most with
/// the member owing the most and settle the smaller of the two
/// positions. The total money moved equals the sum of all positive net
/// positions, and at most `n - 1` payments are suggested for `n`
/// members with a non-zero position.
///
/// Ties are broken by member ID, so the output is deterministic.
///
/// # Errors
///
/// Returns `LedgerError::Overflow` if a net position exceeds the
/// representable bound.
pub fn simplify(balances: &[NetBalance]) -> Result<Vec<SettlementSuggestion>, LedgerError> {
    // Net position per member: positive = owed money, negative = owes.
    let mut positions: BTreeMap<MemberId, i64> = BTreeMap::new();
    for balance in balances {
        let debit = positions.entry(balance.from).or_insert(0);
        *debit = debit
            .checked_sub(balance.amount.cents())
            .ok_or(OverflowError)?;
        let credit = positions.entry(balance.to).or_insert(0);
        *credit = credit
            .checked_add(balance.amount.cents())
            .ok_or(OverflowError)?;
    }

    // Max-heaps keyed by position size; Reverse(id) makes ties resolve
    // toward the smaller member ID.
    let mut creditors: BinaryHeap<(i64, Reverse<MemberId>)> = BinaryHeap::new();
    let mut debtors: BinaryHeap<(i64, Reverse<MemberId>)> = BinaryHeap::new();
    for (member, cents) in positions {
        if cents > 0 {
            creditors.push((cents, Reverse(member)));
        } else if cents < 0 {
            debtors.push((-cents, Reverse(member)));
        }
    }

    let mut suggestions = Vec::new();
    while let (Some((owed, Reverse(creditor))), Some((owing, Reverse(debtor)))) =
        (creditors.pop(), debtors.pop())
    {
        let amount = owed.min(owing);
        suggestions.push(SettlementSuggestion {
            from: debtor,
            to: creditor,
            amount: Money::from_cents(amount),
        });
        if owed > amount {
            creditors.push((owed - amount, Reverse(creditor)));
        }
        if owing > amount {
            debtors.push((owing - amount, Reverse(debtor)));
        }
    }

    Ok(suggestions)
}
