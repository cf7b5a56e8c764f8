//! Error taxonomy for core ledger operations.
//!
//! Every core operation returns a typed result; nothing here is fatal.
//! A rejected operation leaves prior state untouched - the event log is
//! never partially written.

use divvy_shared::types::{
    ExpenseId, GroupId, MemberId, Money, OverflowError, SettlementId,
};
use thiserror::Error;

/// Errors that can occur during core ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Input failed one or more validation checks.
    ///
    /// Every failed sub-check is enumerated so callers can surface the
    /// full list to the user at once.
    #[error("Validation failed: {0}")]
    Validation(ValidationIssues),

    /// A settlement amount is larger than what is currently owed.
    #[error("Settlement of {requested} exceeds the {owed} owed from {from} to {to}")]
    ExceedsOwed {
        /// The paying member.
        from: MemberId,
        /// The receiving member.
        to: MemberId,
        /// The amount currently owed from `from` to `to`.
        owed: Money,
        /// The rejected settlement amount.
        requested: Money,
    },

    /// Arithmetic exceeded the representable bound.
    #[error(transparent)]
    Overflow(#[from] OverflowError),

    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// Member not found in the group.
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// Expense not found in the group's event log.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Settlement not found in the group's event log.
    #[error("Settlement not found: {0}")]
    SettlementNotFound(SettlementId),
}

impl LedgerError {
    /// Wraps a non-empty list of validation issues.
    #[must_use]
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        Self::Validation(ValidationIssues(issues))
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ExceedsOwed { .. } => "EXCEEDS_OWED",
            Self::Overflow(_) => "OVERFLOW",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::SettlementNotFound(_) => "SETTLEMENT_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Overflow(_) => 400,
            Self::ExceedsOwed { .. } => 422,
            Self::GroupNotFound(_)
            | Self::MemberNotFound(_)
            | Self::ExpenseNotFound(_)
            | Self::SettlementNotFound(_) => 404,
        }
    }

    /// Returns the individual validation issues, if any.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation(issues) => &issues.0,
            _ => &[],
        }
    }
}

/// A non-empty list of validation issues, displayed as one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssues(pub Vec<ValidationIssue>);

impl std::fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// A single failed validation sub-check.
///
/// Messages are user-facing: the client collects them into the same
/// error list its forms display before blocking submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    // ========== Participant Set ==========
    /// An expense needs at least one participant.
    #[error("At least one participant is required")]
    EmptyParticipants,

    /// The expense total cannot be negative.
    #[error("Amount cannot be negative (got {total})")]
    NegativeTotal {
        /// The rejected total.
        total: Money,
    },

    /// A participant appears more than once.
    #[error("Participant {0} is listed more than once")]
    DuplicateParticipant(MemberId),

    /// A split parameter references someone outside the participant set.
    #[error("Participant {0} is not part of this expense")]
    UnknownParticipant(MemberId),

    /// A participant has no split parameter.
    #[error("Participant {0} is missing a split entry")]
    MissingSplitEntry(MemberId),

    // ========== Percentage Split ==========
    /// Percentages must sum to exactly 100.0.
    #[error(
        "Percentages must total exactly 100.0% (got {}.{}%)",
        .got_tenths / 10,
        .got_tenths % 10
    )]
    PercentagesMustTotalOneHundred {
        /// The actual sum, in tenths of a percent.
        got_tenths: u32,
    },

    // ========== Custom Split ==========
    /// Custom shares must sum to the expense total.
    #[error("Split amounts must total {expected} (got {got})")]
    SharesMustTotalAmount {
        /// The expense total.
        expected: Money,
        /// The sum of the provided shares.
        got: Money,
    },

    /// A custom share cannot be negative.
    #[error("Split amount for {participant} cannot be negative (got {amount})")]
    NegativeShare {
        /// The participant with the negative share.
        participant: MemberId,
        /// The rejected amount.
        amount: Money,
    },

    // ========== Itemized Split ==========
    /// Item prices must sum to the total within one cent.
    #[error("Item prices must total {expected} within one cent (got {got})")]
    ItemPricesMustTotalAmount {
        /// The expense total.
        expected: Money,
        /// The sum of item prices.
        got: Money,
    },

    /// Every item needs at least one assignee.
    #[error("Item {name:?} has no assignees")]
    ItemWithoutAssignees {
        /// The item name.
        name: String,
    },

    /// Item prices must be positive.
    #[error("Item {name:?} must have a positive price (got {price})")]
    ItemNonPositivePrice {
        /// The item name.
        name: String,
        /// The rejected price.
        price: Money,
    },

    // ========== Contributions ==========
    /// An expense needs at least one contribution.
    #[error("At least one contributor is required")]
    NoContributions,

    /// A payer appears more than once in the contribution list.
    #[error("Contributor {0} is listed more than once")]
    DuplicatePayer(MemberId),

    /// A contribution cannot be negative.
    #[error("Contribution from {payer} cannot be negative (got {amount})")]
    NegativeContribution {
        /// The contributing member.
        payer: MemberId,
        /// The rejected amount.
        amount: Money,
    },

    /// Contributions must sum to the expense total.
    #[error("Contributions must total {expected} (got {got})")]
    ContributionsMustTotalAmount {
        /// The expense total.
        expected: Money,
        /// The sum of contributions.
        got: Money,
    },

    // ========== Settlements ==========
    /// A settlement amount must be positive.
    #[error("Settlement amount must be positive (got {amount})")]
    NonPositiveSettlement {
        /// The rejected amount.
        amount: Money,
    },

    /// A member cannot settle with themselves.
    #[error("Payer and receiver must be different members")]
    SelfSettlement,

    /// Only the payer may modify or delete a settlement.
    #[error("Only the paying member may modify this settlement")]
    NotSettlementPayer,

    /// Only the receiver may approve a settlement.
    #[error("Only the receiving member may approve this settlement")]
    NotSettlementReceiver,

    /// An approved settlement is immutable.
    #[error("Settlement has been approved and can no longer change")]
    SettlementApproved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::validation(vec![ValidationIssue::EmptyParticipants]).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            LedgerError::ExceedsOwed {
                from: MemberId::new(),
                to: MemberId::new(),
                owed: Money::from_cents(5000),
                requested: Money::from_cents(6000),
            }
            .error_code(),
            "EXCEEDS_OWED"
        );
        assert_eq!(
            LedgerError::GroupNotFound(GroupId::new()).error_code(),
            "GROUP_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            LedgerError::validation(vec![ValidationIssue::NoContributions]).http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::ExceedsOwed {
                from: MemberId::new(),
                to: MemberId::new(),
                owed: Money::ZERO,
                requested: Money::from_cents(1),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::SettlementNotFound(SettlementId::new()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::Overflow(OverflowError).http_status_code(),
            400
        );
    }

    #[test]
    fn test_validation_issues_display_joins_all_checks() {
        let err = LedgerError::validation(vec![
            ValidationIssue::NoContributions,
            ValidationIssue::NegativeTotal {
                total: Money::from_cents(-100),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: At least one contributor is required; \
             Amount cannot be negative (got -1.00)"
        );
    }

    #[test]
    fn test_percentage_sum_message_renders_tenths() {
        let issue = ValidationIssue::PercentagesMustTotalOneHundred { got_tenths: 999 };
        assert_eq!(
            issue.to_string(),
            "Percentages must total exactly 100.0% (got 99.9%)"
        );
    }

    #[test]
    fn test_issues_accessor() {
        let err = LedgerError::validation(vec![ValidationIssue::SelfSettlement]);
        assert_eq!(err.issues().len(), 1);
        assert!(LedgerError::GroupNotFound(GroupId::new()).issues().is_empty());
    }
}
