//! The split allocator: total + mode parameters -> exact per-participant shares.

use std::collections::HashMap;

use divvy_shared::types::{MemberId, Money, OverflowError};

use super::types::{Item, Percent, Share, SplitSpec, WHOLE_TENTHS};
use crate::error::{LedgerError, ValidationIssue};

/// Allocates an expense total into one share per participant.
///
/// Invariants, for every mode:
/// - `sum(shares) == total` cent-exactly
/// - every participant appears exactly once in the output, in input
///   order, including zero-amount shares
/// - identical input yields identical output
///
/// # Errors
///
/// Returns `LedgerError::Validation` listing every failed sub-check, or
/// `LedgerError::Overflow` if an amount exceeds the representable bound.
pub fn allocate(
    total: Money,
    participants: &[MemberId],
    spec: &SplitSpec,
) -> Result<Vec<Share>, LedgerError> {
    let mut issues = participant_set_issues(total, participants);
    if !issues.is_empty() {
        return Err(LedgerError::validation(issues));
    }

    let shares = match spec {
        SplitSpec::Equal => allocate_equal(total, participants)?,
        SplitSpec::Percentage(entries) => {
            allocate_percentage(total, participants, entries, &mut issues)?
        }
        SplitSpec::Custom(entries) => allocate_custom(total, participants, entries, &mut issues)?,
        SplitSpec::Itemized(items) => allocate_itemized(total, participants, items, &mut issues)?,
    };

    if !issues.is_empty() {
        return Err(LedgerError::validation(issues));
    }

    debug_assert_eq!(
        Money::checked_sum(shares.iter().map(|s| s.amount)),
        Ok(total),
        "allocator postcondition: shares must sum to the total"
    );
    Ok(shares)
}

/// Checks the participant set itself: non-empty, non-negative total,
/// no duplicate participants.
fn participant_set_issues(total: Money, participants: &[MemberId]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if participants.is_empty() {
        issues.push(ValidationIssue::EmptyParticipants);
    }
    if total.is_negative() {
        issues.push(ValidationIssue::NegativeTotal { total });
    }
    let mut seen = HashMap::with_capacity(participants.len());
    for &participant in participants {
        if seen.insert(participant, ()).is_some() {
            issues.push(ValidationIssue::DuplicateParticipant(participant));
        }
    }
    issues
}

/// Divides `total` into `count` cent-exact parts: the truncated base per
/// part, with the first `total mod count` parts receiving one extra cent.
fn equal_amounts(total: Money, count: usize) -> Result<Vec<Money>, OverflowError> {
    let divisor = i64::try_from(count).map_err(|_| OverflowError)?;
    let base = total.cents() / divisor;
    let remainder = total.cents() % divisor;
    let mut amounts = Vec::with_capacity(count);
    for position in 0..divisor {
        let cents = if position < remainder { base + 1 } else { base };
        amounts.push(Money::from_cents(cents));
    }
    Ok(amounts)
}

fn allocate_equal(total: Money, participants: &[MemberId]) -> Result<Vec<Share>, LedgerError> {
    let amounts = equal_amounts(total, participants.len())?;
    Ok(participants
        .iter()
        .zip(amounts)
        .map(|(&participant, amount)| Share {
            participant,
            amount,
        })
        .collect())
}

/// Builds a per-participant lookup out of a split parameter list,
/// recording unknown, duplicated, and missing entries.
fn entry_lookup<T: Copy>(
    participants: &[MemberId],
    entries: &[(MemberId, T)],
    issues: &mut Vec<ValidationIssue>,
) -> HashMap<MemberId, T> {
    let member_set: HashMap<MemberId, ()> =
        participants.iter().map(|&m| (m, ())).collect();
    let mut lookup = HashMap::with_capacity(entries.len());
    for &(member, value) in entries {
        if !member_set.contains_key(&member) {
            issues.push(ValidationIssue::UnknownParticipant(member));
            continue;
        }
        if lookup.insert(member, value).is_some() {
            issues.push(ValidationIssue::DuplicateParticipant(member));
        }
    }
    for &participant in participants {
        if !lookup.contains_key(&participant) {
            issues.push(ValidationIssue::MissingSplitEntry(participant));
        }
    }
    lookup
}

fn allocate_percentage(
    total: Money,
    participants: &[MemberId],
    entries: &[(MemberId, Percent)],
    issues: &mut Vec<ValidationIssue>,
) -> Result<Vec<Share>, LedgerError> {
    let lookup = entry_lookup(participants, entries, issues);

    let got_tenths: u32 = entries.iter().map(|(_, pct)| u32::from(pct.tenths())).sum();
    if got_tenths != WHOLE_TENTHS {
        issues.push(ValidationIssue::PercentagesMustTotalOneHundred { got_tenths });
    }
    if !issues.is_empty() {
        return Ok(Vec::new());
    }

    // Round each share half-up, then push the accumulated rounding drift
    // onto the last participant so the sum lands exactly on the total.
    let mut shares = Vec::with_capacity(participants.len());
    let mut allocated = Money::ZERO;
    for &participant in participants {
        let tenths = lookup[&participant].tenths();
        let amount = total.multiply_by_ratio(i64::from(tenths), i64::from(WHOLE_TENTHS))?;
        allocated = allocated.checked_add(amount)?;
        shares.push(Share {
            participant,
            amount,
        });
    }
    let drift = total.checked_sub(allocated)?;
    if !drift.is_zero()
        && let Some(last) = shares.last_mut()
    {
        last.amount = last.amount.checked_add(drift)?;
    }
    Ok(shares)
}

fn allocate_custom(
    total: Money,
    participants: &[MemberId],
    entries: &[(MemberId, Money)],
    issues: &mut Vec<ValidationIssue>,
) -> Result<Vec<Share>, LedgerError> {
    let lookup = entry_lookup(participants, entries, issues);

    for &(participant, amount) in entries {
        if amount.is_negative() {
            issues.push(ValidationIssue::NegativeShare {
                participant,
                amount,
            });
        }
    }
    let got = Money::checked_sum(entries.iter().map(|&(_, amount)| amount))?;
    if got != total {
        issues.push(ValidationIssue::SharesMustTotalAmount {
            expected: total,
            got,
        });
    }
    if !issues.is_empty() {
        return Ok(Vec::new());
    }

    Ok(participants
        .iter()
        .map(|&participant| Share {
            participant,
            amount: lookup[&participant],
        })
        .collect())
}

fn allocate_itemized(
    total: Money,
    participants: &[MemberId],
    items: &[Item],
    issues: &mut Vec<ValidationIssue>,
) -> Result<Vec<Share>, LedgerError> {
    let member_set: HashMap<MemberId, ()> =
        participants.iter().map(|&m| (m, ())).collect();

    for item in items {
        if !item.price.is_positive() {
            issues.push(ValidationIssue::ItemNonPositivePrice {
                name: item.name.clone(),
                price: item.price,
            });
        }
        if item.assignees.is_empty() {
            issues.push(ValidationIssue::ItemWithoutAssignees {
                name: item.name.clone(),
            });
        }
        let mut seen = HashMap::with_capacity(item.assignees.len());
        for &assignee in &item.assignees {
            if !member_set.contains_key(&assignee) {
                issues.push(ValidationIssue::UnknownParticipant(assignee));
            }
            if seen.insert(assignee, ()).is_some() {
                issues.push(ValidationIssue::DuplicateParticipant(assignee));
            }
        }
    }

    let item_sum = Money::checked_sum(items.iter().map(|item| item.price))?;
    // One cent of aggregate tolerance absorbs item-level rounding on
    // scanned receipts; anything beyond that is a data error.
    if item_sum.checked_sub(total)?.abs() > Money::from_cents(1) {
        issues.push(ValidationIssue::ItemPricesMustTotalAmount {
            expected: total,
            got: item_sum,
        });
    }
    if !issues.is_empty() {
        return Ok(Vec::new());
    }

    let mut cents_for: HashMap<MemberId, Money> =
        participants.iter().map(|&m| (m, Money::ZERO)).collect();
    for item in items {
        let amounts = equal_amounts(item.price, item.assignees.len())?;
        for (&assignee, amount) in item.assignees.iter().zip(amounts) {
            if let Some(entry) = cents_for.get_mut(&assignee) {
                *entry = entry.checked_add(amount)?;
            }
        }
    }

    let mut shares: Vec<Share> = participants
        .iter()
        .map(|&participant| Share {
            participant,
            amount: cents_for[&participant],
        })
        .collect();

    // The tolerated cent of item drift still has to land somewhere for
    // the shares to sum exactly to the total: the last participant in
    // input order holding a non-zero share absorbs it.
    let drift = total.checked_sub(item_sum)?;
    if !drift.is_zero() {
        let target = shares
            .iter()
            .rposition(|share| !share.amount.is_zero())
            .unwrap_or(shares.len() - 1);
        shares[target].amount = shares[target].amount.checked_add(drift)?;
    }
    Ok(shares)
}
