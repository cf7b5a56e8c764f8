//! Expense factory: validate, allocate, reconcile, construct.

use chrono::Utc;
use divvy_shared::types::ExpenseId;

use super::reconcile::contribution_issues;
use super::types::{CreateExpenseInput, Expense};
use crate::error::LedgerError;
use crate::split::allocate;

/// Expense creation service.
///
/// Pure business logic with no storage dependencies: appending the
/// resulting record to the group's event log is the caller's job.
pub struct ExpenseService;

impl ExpenseService {
    /// Validates the input and constructs an immutable `Expense`.
    ///
    /// Runs the split allocator and the contribution reconciler,
    /// gathering every validation issue from both before rejecting, so
    /// the caller can present the complete list at once.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` with all failed sub-checks, or
    /// `LedgerError::Overflow` on an arithmetic bound.
    pub fn create(input: CreateExpenseInput) -> Result<Expense, LedgerError> {
        let mut issues = Vec::new();

        let shares = match allocate(input.total, &input.participants, &input.split) {
            Ok(shares) => Some(shares),
            Err(LedgerError::Validation(split_issues)) => {
                issues.extend(split_issues.0);
                None
            }
            Err(other) => return Err(other),
        };

        issues.extend(contribution_issues(input.total, &input.contributions)?);

        if !issues.is_empty() {
            return Err(LedgerError::validation(issues));
        }

        let shares = shares.unwrap_or_default();
        Ok(Expense {
            id: ExpenseId::new(),
            group: input.group,
            description: input.description,
            total: input.total,
            created_at: Utc::now(),
            split_mode: input.split.mode(),
            shares,
            contributions: input.contributions,
        })
    }
}
