//! The group registry and per-group event logs.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use divvy_core::error::LedgerError;
use divvy_core::expense::{CreateExpenseInput, Expense, ExpenseService};
use divvy_core::ledger::{compute_balances, simplify, GroupEvent, NetBalance, SettlementSuggestion};
use divvy_core::settlement::{Settlement, SettlementService};
use divvy_shared::types::{
    ExpenseId, GroupId, MemberId, Money, PageRequest, PageResponse, SettlementId,
};

use crate::group::{Group, Member};

/// Per-group state: the roster and the append-only event log.
///
/// Held behind a `RwLock` so that all validating writes are serialized
/// per group while reads proceed concurrently from a snapshot.
#[derive(Debug)]
struct GroupState {
    group: Group,
    events: Vec<GroupEvent>,
}

/// The in-memory registry of groups and their event logs.
#[derive(Debug, Default)]
pub struct GroupStore {
    groups: DashMap<GroupId, Arc<RwLock<GroupState>>>,
}

impl GroupStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a group with the given member names.
    pub async fn create_group(&self, name: String, member_names: Vec<String>) -> Group {
        let members: Vec<Member> = member_names
            .into_iter()
            .map(|member_name| Member {
                id: MemberId::new(),
                name: member_name,
            })
            .collect();
        let group = Group {
            id: GroupId::new(),
            name,
            members,
        };
        info!(group = %group.id, members = group.members.len(), "group created");
        self.groups.insert(
            group.id,
            Arc::new(RwLock::new(GroupState {
                group: group.clone(),
                events: Vec::new(),
            })),
        );
        group
    }

    /// Adds a member to an existing group.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::GroupNotFound` if the group does not exist.
    pub async fn add_member(&self, group_id: GroupId, name: String) -> Result<Member, LedgerError> {
        let state = self.state(group_id)?;
        let mut guard = state.write().await;
        let member = Member {
            id: MemberId::new(),
            name,
        };
        guard.group.members.push(member.clone());
        debug!(group = %group_id, member = %member.id, "member added");
        Ok(member)
    }

    /// Returns a snapshot of the group record.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::GroupNotFound` if the group does not exist.
    pub async fn group(&self, group_id: GroupId) -> Result<Group, LedgerError> {
        let state = self.state(group_id)?;
        let guard = state.read().await;
        Ok(guard.group.clone())
    }

    /// Validates and appends an expense to the group's event log.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::GroupNotFound` / `MemberNotFound` for bad
    /// references, or any validation error from the expense factory.
    pub async fn record_expense(
        &self,
        input: CreateExpenseInput,
    ) -> Result<Expense, LedgerError> {
        let state = self.state(input.group)?;
        let mut guard = state.write().await;

        for &participant in &input.participants {
            if !guard.group.has_member(participant) {
                return Err(LedgerError::MemberNotFound(participant));
            }
        }
        for contribution in &input.contributions {
            if !guard.group.has_member(contribution.payer) {
                return Err(LedgerError::MemberNotFound(contribution.payer));
            }
        }

        let expense = ExpenseService::create(input)?;
        debug!(group = %expense.group, expense = %expense.id, total = %expense.total, "expense recorded");
        guard.events.push(GroupEvent::Expense(expense.clone()));
        Ok(expense)
    }

    /// Returns a single expense record.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ExpenseNotFound` if no such expense exists.
    pub async fn expense(
        &self,
        group_id: GroupId,
        expense_id: ExpenseId,
    ) -> Result<Expense, LedgerError> {
        let state = self.state(group_id)?;
        let guard = state.read().await;
        guard
            .events
            .iter()
            .find_map(|event| match event {
                GroupEvent::Expense(expense) if expense.id == expense_id => {
                    Some(expense.clone())
                }
                _ => None,
            })
            .ok_or(LedgerError::ExpenseNotFound(expense_id))
    }

    /// Deletes an expense; balances reflect the removal on the next read.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ExpenseNotFound` if no such expense exists.
    pub async fn delete_expense(
        &self,
        group_id: GroupId,
        expense_id: ExpenseId,
    ) -> Result<(), LedgerError> {
        let state = self.state(group_id)?;
        let mut guard = state.write().await;
        let position = guard
            .events
            .iter()
            .position(|event| event.expense_id() == Some(expense_id))
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        guard.events.remove(position);
        debug!(group = %group_id, expense = %expense_id, "expense deleted");
        Ok(())
    }

    /// Lists the group's expenses, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::GroupNotFound` if the group does not exist.
    pub async fn list_expenses(
        &self,
        group_id: GroupId,
        page: PageRequest,
    ) -> Result<PageResponse<Expense>, LedgerError> {
        let state = self.state(group_id)?;
        let guard = state.read().await;
        let mut expenses: Vec<Expense> = guard
            .events
            .iter()
            .filter_map(|event| match event {
                GroupEvent::Expense(expense) => Some(expense.clone()),
                GroupEvent::Settlement(_) => None,
            })
            .collect();
        expenses.reverse();
        Ok(paginate(expenses, page))
    }

    /// Validates and appends a settlement from `from` to `to`.
    ///
    /// Runs under the group's write lock, so validation always sees the
    /// latest committed balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ExceedsOwed` if the amount overpays, or a
    /// validation / not-found error for bad input.
    pub async fn record_settlement(
        &self,
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Money,
    ) -> Result<Settlement, LedgerError> {
        let state = self.state(group_id)?;
        let mut guard = state.write().await;

        for member in [from, to] {
            if !guard.group.has_member(member) {
                return Err(LedgerError::MemberNotFound(member));
            }
        }

        let settlement = SettlementService::create(&guard.events, group_id, from, to, amount)?;
        debug!(group = %group_id, settlement = %settlement.id, amount = %amount, "settlement recorded");
        guard.events.push(GroupEvent::Settlement(settlement.clone()));
        Ok(settlement)
    }

    /// Edits a settlement amount, re-validating against a balance that
    /// excludes the settlement being edited.
    ///
    /// # Errors
    ///
    /// Returns any validation error from the settlement service.
    pub async fn update_settlement(
        &self,
        group_id: GroupId,
        settlement_id: SettlementId,
        actor: MemberId,
        amount: Money,
    ) -> Result<Settlement, LedgerError> {
        let state = self.state(group_id)?;
        let mut guard = state.write().await;
        let updated =
            SettlementService::update_amount(&guard.events, settlement_id, actor, amount)?;
        replace_settlement(&mut guard.events, updated.clone());
        debug!(group = %group_id, settlement = %settlement_id, amount = %amount, "settlement updated");
        Ok(updated)
    }

    /// Records the receiver's approval, freezing the settlement.
    ///
    /// # Errors
    ///
    /// Returns any validation error from the settlement service.
    pub async fn approve_settlement(
        &self,
        group_id: GroupId,
        settlement_id: SettlementId,
        actor: MemberId,
    ) -> Result<Settlement, LedgerError> {
        let state = self.state(group_id)?;
        let mut guard = state.write().await;
        let approved = SettlementService::approve(&guard.events, settlement_id, actor)?;
        replace_settlement(&mut guard.events, approved.clone());
        debug!(group = %group_id, settlement = %settlement_id, "settlement approved");
        Ok(approved)
    }

    /// Deletes a settlement (payer only, before approval).
    ///
    /// # Errors
    ///
    /// Returns any validation error from the settlement service.
    pub async fn delete_settlement(
        &self,
        group_id: GroupId,
        settlement_id: SettlementId,
        actor: MemberId,
    ) -> Result<(), LedgerError> {
        let state = self.state(group_id)?;
        let mut guard = state.write().await;
        SettlementService::validate_delete(&guard.events, settlement_id, actor)?;
        guard
            .events
            .retain(|event| event.settlement_id() != Some(settlement_id));
        debug!(group = %group_id, settlement = %settlement_id, "settlement deleted");
        Ok(())
    }

    /// Lists the group's settlements, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::GroupNotFound` if the group does not exist.
    pub async fn list_settlements(
        &self,
        group_id: GroupId,
        page: PageRequest,
    ) -> Result<PageResponse<Settlement>, LedgerError> {
        let state = self.state(group_id)?;
        let guard = state.read().await;
        let mut settlements: Vec<Settlement> = guard
            .events
            .iter()
            .filter_map(|event| match event {
                GroupEvent::Settlement(settlement) => Some(settlement.clone()),
                GroupEvent::Expense(_) => None,
            })
            .collect();
        settlements.reverse();
        Ok(paginate(settlements, page))
    }

    /// Recomputes the group's net pairwise balances from its event log.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::GroupNotFound` or `Overflow`.
    pub async fn balances(&self, group_id: GroupId) -> Result<Vec<NetBalance>, LedgerError> {
        let state = self.state(group_id)?;
        let events = {
            let guard = state.read().await;
            guard.events.clone()
        };
        compute_balances(&events)
    }

    /// Reduces the group's balances to a suggested payment list.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::GroupNotFound` or `Overflow`.
    pub async fn suggested_settlements(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<SettlementSuggestion>, LedgerError> {
        let balances = self.balances(group_id).await?;
        simplify(&balances)
    }

    fn state(&self, group_id: GroupId) -> Result<Arc<RwLock<GroupState>>, LedgerError> {
        self.groups
            .get(&group_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::GroupNotFound(group_id))
    }
}

/// Swaps an edited settlement into the log in place, preserving event
/// order.
fn replace_settlement(events: &mut [GroupEvent], updated: Settlement) {
    for event in events.iter_mut() {
        if event.settlement_id() == Some(updated.id) {
            *event = GroupEvent::Settlement(updated);
            break;
        }
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> PageResponse<T> {
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    let data: Vec<T> = items
        .into_iter()
        .skip(page.offset())
        .take(page.limit())
        .collect();
    PageResponse::new(data, page.page, page.per_page, total)
}
