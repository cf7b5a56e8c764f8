//! Settlement validation against the current ledger state.

use chrono::Utc;
use divvy_shared::types::{GroupId, MemberId, Money, SettlementId};

use super::types::Settlement;
use crate::error::{LedgerError, ValidationIssue};
use crate::ledger::{current_owed, GroupEvent};

/// Settlement validation and construction service.
///
/// Pure business logic: callers hand in a consistent snapshot of the
/// group's event log and are responsible for serializing writes per
/// group, so validation always runs against the latest committed
/// balance.
pub struct SettlementService;

impl SettlementService {
    /// Validates and constructs a settlement from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` if the amount is non-positive or the
    ///   payer and receiver coincide
    /// - `LedgerError::ExceedsOwed` if the amount is larger than what
    ///   `from` currently owes `to`
    pub fn create(
        events: &[GroupEvent],
        group: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
    ) -> Result<Settlement, LedgerError> {
        let mut issues = Vec::new();
        if !amount.is_positive() {
            issues.push(ValidationIssue::NonPositiveSettlement { amount });
        }
        if from == to {
            issues.push(ValidationIssue::SelfSettlement);
        }
        if !issues.is_empty() {
            return Err(LedgerError::validation(issues));
        }

        let owed = current_owed(events, from, to)?;
        if amount > owed {
            return Err(LedgerError::ExceedsOwed {
                from,
                to,
                owed,
                requested: amount,
            });
        }

        Ok(Settlement {
            id: SettlementId::new(),
            group,
            from,
            to,
            amount,
            created_at: Utc::now(),
            approved: false,
        })
    }

    /// Validates an amount edit and returns the updated record.
    ///
    /// The overpayment check runs against a recomputed balance that
    /// excludes the settlement being edited, so a payer cannot edit
    /// their way past what was ever owed.
    ///
    /// # Errors
    ///
    /// - `LedgerError::SettlementNotFound` if the ID is not in the log
    /// - `LedgerError::Validation` if the actor is not the payer, the
    ///   settlement is approved, or the amount is non-positive
    /// - `LedgerError::ExceedsOwed` if the new amount overpays
    pub fn update_amount(
        events: &[GroupEvent],
        id: SettlementId,
        actor: MemberId,
        new_amount: Money,
    ) -> Result<Settlement, LedgerError> {
        let settlement = find_settlement(events, id)?;

        let mut issues = Vec::new();
        if settlement.from != actor {
            issues.push(ValidationIssue::NotSettlementPayer);
        }
        if settlement.approved {
            issues.push(ValidationIssue::SettlementApproved);
        }
        if !new_amount.is_positive() {
            issues.push(ValidationIssue::NonPositiveSettlement { amount: new_amount });
        }
        if !issues.is_empty() {
            return Err(LedgerError::validation(issues));
        }

        let remaining: Vec<GroupEvent> = events
            .iter()
            .filter(|event| event.settlement_id() != Some(id))
            .cloned()
            .collect();
        let owed = current_owed(&remaining, settlement.from, settlement.to)?;
        if new_amount > owed {
            return Err(LedgerError::ExceedsOwed {
                from: settlement.from,
                to: settlement.to,
                owed,
                requested: new_amount,
            });
        }

        Ok(Settlement {
            amount: new_amount,
            ..settlement.clone()
        })
    }

    /// Validates that `actor` may delete the settlement.
    ///
    /// # Errors
    ///
    /// - `LedgerError::SettlementNotFound` if the ID is not in the log
    /// - `LedgerError::Validation` if the actor is not the payer or the
    ///   settlement is approved
    pub fn validate_delete(
        events: &[GroupEvent],
        id: SettlementId,
        actor: MemberId,
    ) -> Result<(), LedgerError> {
        let settlement = find_settlement(events, id)?;

        let mut issues = Vec::new();
        if settlement.from != actor {
            issues.push(ValidationIssue::NotSettlementPayer);
        }
        if settlement.approved {
            issues.push(ValidationIssue::SettlementApproved);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::validation(issues))
        }
    }

    /// Validates the receiver's approval and returns the approved record.
    ///
    /// Approval ends the settlement's mutable lifecycle: once approved
    /// it can no longer be edited or deleted.
    ///
    /// # Errors
    ///
    /// - `LedgerError::SettlementNotFound` if the ID is not in the log
    /// - `LedgerError::Validation` if the actor is not the receiver or
    ///   the settlement is already approved
    pub fn approve(
        events: &[GroupEvent],
        id: SettlementId,
        actor: MemberId,
    ) -> Result<Settlement, LedgerError> {
        let settlement = find_settlement(events, id)?;

        let mut issues = Vec::new();
        if settlement.to != actor {
            issues.push(ValidationIssue::NotSettlementReceiver);
        }
        if settlement.approved {
            issues.push(ValidationIssue::SettlementApproved);
        }
        if !issues.is_empty() {
            return Err(LedgerError::validation(issues));
        }

        Ok(Settlement {
            approved: true,
            ..settlement.clone()
        })
    }
}

fn find_settlement(
    events: &[GroupEvent],
    id: SettlementId,
) -> Result<&Settlement, LedgerError> {
    events
        .iter()
        .find_map(|event| match event {
            GroupEvent::Settlement(settlement) if settlement.id == id => Some(settlement),
            _ => None,
        })
        .ok_or(LedgerError::SettlementNotFound(id))
}
