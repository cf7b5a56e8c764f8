//! Contribution reconciliation: who paid must cover the total exactly.

use std::collections::HashMap;

use divvy_shared::types::{Money, OverflowError};

use super::types::Contribution;
use crate::error::{LedgerError, ValidationIssue};

/// Validates that a set of contributions sums exactly to the expense
/// total.
///
/// There is no partial-payment concept at expense-creation time: an
/// expense's contributions always cover 100% of its total at the moment
/// it is recorded.
///
/// # Errors
///
/// Returns `LedgerError::Validation` listing every failed sub-check.
pub fn reconcile(total: Money, contributions: &[Contribution]) -> Result<(), LedgerError> {
    let issues = contribution_issues(total, contributions)?;
    if issues.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::validation(issues))
    }
}

/// Collects every failed contribution sub-check.
pub(crate) fn contribution_issues(
    total: Money,
    contributions: &[Contribution],
) -> Result<Vec<ValidationIssue>, OverflowError> {
    let mut issues = Vec::new();

    if contributions.is_empty() {
        issues.push(ValidationIssue::NoContributions);
        return Ok(issues);
    }

    let mut seen = HashMap::with_capacity(contributions.len());
    for contribution in contributions {
        if seen.insert(contribution.payer, ()).is_some() {
            issues.push(ValidationIssue::DuplicatePayer(contribution.payer));
        }
        if contribution.amount.is_negative() {
            issues.push(ValidationIssue::NegativeContribution {
                payer: contribution.payer,
                amount: contribution.amount,
            });
        }
    }

    let got = Money::checked_sum(contributions.iter().map(|c| c.amount))?;
    if got != total {
        issues.push(ValidationIssue::ContributionsMustTotalAmount {
            expected: total,
            got,
        });
    }

    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use divvy_shared::types::MemberId;

    fn contribution(payer: MemberId, cents: i64) -> Contribution {
        Contribution {
            payer,
            amount: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_single_payer_covering_total() {
        let payer = MemberId::new();
        assert!(reconcile(Money::from_cents(3000), &[contribution(payer, 3000)]).is_ok());
    }

    #[test]
    fn test_multiple_payers_covering_total() {
        let contributions = [
            contribution(MemberId::new(), 2000),
            contribution(MemberId::new(), 1000),
        ];
        assert!(reconcile(Money::from_cents(3000), &contributions).is_ok());
    }

    #[test]
    fn test_empty_contributions_rejected() {
        let err = reconcile(Money::from_cents(100), &[]).unwrap_err();
        assert_eq!(err.issues(), &[ValidationIssue::NoContributions]);
    }

    #[test]
    fn test_duplicate_payer_rejected() {
        let payer = MemberId::new();
        let contributions = [contribution(payer, 500), contribution(payer, 500)];
        let err = reconcile(Money::from_cents(1000), &contributions).unwrap_err();
        assert!(err
            .issues()
            .contains(&ValidationIssue::DuplicatePayer(payer)));
    }

    #[test]
    fn test_sum_off_by_one_cent_rejected() {
        let contributions = [contribution(MemberId::new(), 999)];
        let err = reconcile(Money::from_cents(1000), &contributions).unwrap_err();
        assert!(matches!(
            err.issues()[0],
            ValidationIssue::ContributionsMustTotalAmount { got, .. }
                if got == Money::from_cents(999)
        ));
    }

    #[test]
    fn test_negative_contribution_rejected() {
        let payer = MemberId::new();
        let contributions = [
            contribution(payer, -100),
            contribution(MemberId::new(), 1100),
        ];
        let err = reconcile(Money::from_cents(1000), &contributions).unwrap_err();
        assert!(err.issues().iter().any(|issue| matches!(
            issue,
            ValidationIssue::NegativeContribution { .. }
        )));
    }

    #[test]
    fn test_all_failures_reported_together() {
        let payer = MemberId::new();
        let contributions = [contribution(payer, -100), contribution(payer, 500)];
        let err = reconcile(Money::from_cents(1000), &contributions).unwrap_err();
        // Duplicate payer, negative amount, and sum mismatch all listed.
        assert_eq!(err.issues().len(), 3);
    }
}
