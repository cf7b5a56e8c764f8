//! Property-based tests for balance aggregation.
//!
//! The load-bearing property: the fold is a pure, commutative function
//! of the event log, so processing order can never change a balance.

use proptest::prelude::*;

use chrono::Utc;
use divvy_shared::types::{ExpenseId, GroupId, MemberId, Money, SettlementId};

use super::balance::compute_balances;
use super::simplify::simplify;
use super::types::GroupEvent;
use crate::expense::{Contribution, Expense};
use crate::settlement::Settlement;
use crate::split::{allocate, SplitSpec};

/// A pool of members with a stable ordering for index-based generation.
fn member_pool() -> Vec<MemberId> {
    (0..6).map(|_| MemberId::new()).collect()
}

/// Compact description of a generated expense: payer index, total, and
/// how many pool members participate.
#[derive(Debug, Clone)]
struct ExpensePlan {
    payer: usize,
    total_cents: i64,
    participant_count: usize,
}

fn expense_plan() -> impl Strategy<Value = ExpensePlan> {
    (0usize..6, 1i64..100_000, 2usize..=6).prop_map(|(payer, total_cents, participant_count)| {
        ExpensePlan {
            payer,
            total_cents,
            participant_count,
        }
    })
}

/// Builds a real expense through the allocator so its shares are valid.
fn build_expense(pool: &[MemberId], plan: &ExpensePlan) -> GroupEvent {
    let participants: Vec<MemberId> = pool[..plan.participant_count].to_vec();
    let total = Money::from_cents(plan.total_cents);
    let shares = allocate(total, &participants, &SplitSpec::Equal).unwrap();
    GroupEvent::Expense(Expense {
        id: ExpenseId::new(),
        group: GroupId::new(),
        description: "generated".to_string(),
        total,
        created_at: Utc::now(),
        split_mode: SplitSpec::Equal.mode(),
        shares,
        contributions: vec![Contribution {
            payer: pool[plan.payer],
            amount: total,
        }],
    })
}

fn build_settlement(pool: &[MemberId], from: usize, to: usize, cents: i64) -> GroupEvent {
    GroupEvent::Settlement(Settlement {
        id: SettlementId::new(),
        group: GroupId::new(),
        from: pool[from],
        to: pool[to],
        amount: Money::from_cents(cents),
        created_at: Utc::now(),
        approved: false,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Shuffling the event log never changes the computed balances.
    #[test]
    fn prop_fold_is_order_independent(
        plans in prop::collection::vec(expense_plan(), 1..10),
        settlements in prop::collection::vec((0usize..6, 0usize..6, 1i64..10_000), 0..5),
        shuffle_seed in any::<u64>(),
    ) {
        let pool = member_pool();
        let mut events: Vec<GroupEvent> = plans.iter().map(|p| build_expense(&pool, p)).collect();
        for &(from, to, cents) in &settlements {
            if from != to {
                events.push(build_settlement(&pool, from, to, cents));
            }
        }

        let baseline = compute_balances(&events).unwrap();

        // Deterministic Fisher-Yates driven by the generated seed.
        let mut state = shuffle_seed;
        for i in (1..events.len()).rev() {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            #[allow(clippy::cast_possible_truncation)]
            let j = (state % (i as u64 + 1)) as usize;
            events.swap(i, j);
        }

        let shuffled = compute_balances(&events).unwrap();
        prop_assert_eq!(baseline, shuffled);
    }

    /// Every cent a payer advances for others is owed back: summing
    /// each member's net position over the balance edges gives zero.
    #[test]
    fn prop_positions_sum_to_zero(
        plans in prop::collection::vec(expense_plan(), 1..10),
    ) {
        let pool = member_pool();
        let events: Vec<GroupEvent> = plans.iter().map(|p| build_expense(&pool, p)).collect();
        let balances = compute_balances(&events).unwrap();

        for balance in &balances {
            prop_assert!(balance.amount.is_positive());
        }

        let mut positions: std::collections::BTreeMap<MemberId, i64> = std::collections::BTreeMap::new();
        for balance in &balances {
            *positions.entry(balance.from).or_insert(0) -= balance.amount.cents();
            *positions.entry(balance.to).or_insert(0) += balance.amount.cents();
        }
        let net: i64 = positions.values().sum();
        prop_assert_eq!(net, 0);
    }

    /// Simplification conserves flow and needs at most n-1 payments.
    #[test]
    fn prop_simplify_conserves_flow(
        plans in prop::collection::vec(expense_plan(), 1..10),
    ) {
        let pool = member_pool();
        let events: Vec<GroupEvent> = plans.iter().map(|p| build_expense(&pool, p)).collect();
        let balances = compute_balances(&events).unwrap();
        let suggestions = simplify(&balances).unwrap();

        let mut positions: std::collections::BTreeMap<MemberId, i64> = std::collections::BTreeMap::new();
        for balance in &balances {
            *positions.entry(balance.from).or_insert(0) -= balance.amount.cents();
            *positions.entry(balance.to).or_insert(0) += balance.amount.cents();
        }
        let nonzero = positions.values().filter(|&&cents| cents != 0).count();
        if nonzero == 0 {
            prop_assert!(suggestions.is_empty());
        } else {
            prop_assert!(suggestions.len() <= nonzero - 1);
        }

        let positive_total: i64 = positions.values().filter(|&&cents| cents > 0).sum();
        let moved: i64 = suggestions.iter().map(|s| s.amount.cents()).sum();
        prop_assert_eq!(moved, positive_total);

        // Applying the suggestions settles everyone.
        for suggestion in &suggestions {
            *positions.entry(suggestion.from).or_insert(0) += suggestion.amount.cents();
            *positions.entry(suggestion.to).or_insert(0) -= suggestion.amount.cents();
        }
        prop_assert!(positions.values().all(|&cents| cents == 0));
    }
}
