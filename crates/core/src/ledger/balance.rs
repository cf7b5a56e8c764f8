//! Balance aggregation: a pure fold of the event log into net pairwise
//! balances.

use std::collections::BTreeMap;

use divvy_shared::types::{MemberId, Money, OverflowError};

use super::types::{GroupEvent, NetBalance};
use crate::error::LedgerError;
use crate::expense::Expense;

/// Signed accumulator per unordered member pair.
///
/// The key is the pair ordered by member ID; a positive value means the
/// first member owes the second.
type PairAccumulator = BTreeMap<(MemberId, MemberId), i64>;

/// Computes the net pairwise balances for a group's event log.
///
/// The fold is a pure function of the log: it is deterministic,
/// side-effect-free, and commutative over event order, so shuffling the
/// log yields identical balances. Each expense is treated as its payers
/// advancing money on behalf of its participants, each participant's
/// share apportioned across the payers proportionally to what they
/// paid. Each settlement reduces what its payer owes its receiver.
///
/// Pairs that net to exactly zero are omitted; every emitted edge is
/// strictly positive and directed debtor -> creditor.
///
/// # Errors
///
/// Returns `LedgerError::Overflow` if an accumulator exceeds the
/// representable bound.
pub fn compute_balances(events: &[GroupEvent]) -> Result<Vec<NetBalance>, LedgerError> {
    let mut pairs = PairAccumulator::new();

    for event in events {
        match event {
            GroupEvent::Expense(expense) => fold_expense(&mut pairs, expense)?,
            GroupEvent::Settlement(settlement) => {
                // A payment from `from` reduces what `from` owes `to`.
                accumulate(
                    &mut pairs,
                    settlement.from,
                    settlement.to,
                    -settlement.amount.cents(),
                )?;
            }
        }
    }

    Ok(pairs
        .into_iter()
        .filter(|&(_, net)| net != 0)
        .map(|((a, b), net)| {
            if net > 0 {
                NetBalance {
                    from: a,
                    to: b,
                    amount: Money::from_cents(net),
                }
            } else {
                NetBalance {
                    from: b,
                    to: a,
                    amount: Money::from_cents(-net),
                }
            }
        })
        .collect())
}

/// Returns the amount `from` currently owes `to` under the given log.
///
/// # Errors
///
/// Returns `LedgerError::Overflow` if balance computation overflows.
pub fn current_owed(
    events: &[GroupEvent],
    from: MemberId,
    to: MemberId,
) -> Result<Money, LedgerError> {
    Ok(compute_balances(events)?
        .into_iter()
        .find(|balance| balance.from == from && balance.to == to)
        .map_or(Money::ZERO, |balance| balance.amount))
}

fn fold_expense(pairs: &mut PairAccumulator, expense: &Expense) -> Result<(), LedgerError> {
    let weights: Vec<Money> = expense.contributions.iter().map(|c| c.amount).collect();

    for share in &expense.shares {
        let parts = apportion(share.amount, &weights)?;
        for (contribution, part) in expense.contributions.iter().zip(parts) {
            // A payer covering their own share produces no debt.
            if contribution.payer == share.participant || part.is_zero() {
                continue;
            }
            accumulate(pairs, share.participant, contribution.payer, part.cents())?;
        }
    }
    Ok(())
}

/// Adds `cents` of debt from `debtor` to `creditor` onto the signed
/// pair accumulator.
fn accumulate(
    pairs: &mut PairAccumulator,
    debtor: MemberId,
    creditor: MemberId,
    cents: i64,
) -> Result<(), OverflowError> {
    let (key, signed) = if debtor < creditor {
        ((debtor, creditor), cents)
    } else {
        ((creditor, debtor), -cents)
    };
    let slot = pairs.entry(key).or_insert(0);
    *slot = slot.checked_add(signed).ok_or(OverflowError)?;
    Ok(())
}

/// Distributes `amount` across `weights` proportionally and
/// cent-exactly: truncate each part, then hand the leftover cents to
/// the earliest positive weights in order.
///
/// Single-weight inputs (the common single-payer expense) come back
/// unchanged.
fn apportion(amount: Money, weights: &[Money]) -> Result<Vec<Money>, OverflowError> {
    if amount.is_zero() {
        return Ok(vec![Money::ZERO; weights.len()]);
    }
    let total_weight = Money::checked_sum(weights.iter().copied())?;
    if total_weight.is_zero() {
        return Err(OverflowError);
    }

    let mut parts = Vec::with_capacity(weights.len());
    let mut allocated: i64 = 0;
    for weight in weights {
        let cents = i128::from(amount.cents()) * i128::from(weight.cents())
            / i128::from(total_weight.cents());
        let cents = i64::try_from(cents).map_err(|_| OverflowError)?;
        allocated = allocated.checked_add(cents).ok_or(OverflowError)?;
        parts.push(cents);
    }

    let mut leftover = amount.cents().checked_sub(allocated).ok_or(OverflowError)?;
    for (part, weight) in parts.iter_mut().zip(weights) {
        if leftover == 0 {
            break;
        }
        if weight.is_positive() {
            *part += 1;
            leftover -= 1;
        }
    }

    Ok(parts.into_iter().map(Money::from_cents).collect())
}
