//! Property-based tests for the split allocator.
//!
//! The core invariant: for any valid input, shares sum to the total
//! cent-exactly and cover the participant set exactly once.

use proptest::prelude::*;

use divvy_shared::types::{MemberId, Money};

use super::allocate::allocate;
use super::types::{Item, Percent, SplitSpec};

fn members(count: usize) -> Vec<MemberId> {
    (0..count).map(|_| MemberId::new()).collect()
}

/// Strategy for a non-negative total up to 100,000.00.
fn total_cents() -> impl Strategy<Value = i64> {
    0i64..10_000_000
}

/// Strategy for a participant count.
fn participant_count() -> impl Strategy<Value = usize> {
    1usize..9
}

/// Splits 1000 tenths of a percent into `count` non-negative integer
/// parts by cutting the interval at sorted random points.
fn percent_partition(count: usize) -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..=1000, count - 1).prop_map(move |mut cuts| {
        cuts.sort_unstable();
        let mut parts = Vec::with_capacity(count);
        let mut previous = 0u16;
        for cut in cuts {
            parts.push(cut - previous);
            previous = cut;
        }
        parts.push(1000 - previous);
        parts
    })
}

fn assert_allocation_invariants(shares: &[super::types::Share], participants: &[MemberId], total: i64) {
    assert_eq!(shares.len(), participants.len());
    for (share, &participant) in shares.iter().zip(participants) {
        assert_eq!(share.participant, participant);
    }
    assert_eq!(
        Money::checked_sum(shares.iter().map(|s| s.amount)).unwrap(),
        Money::from_cents(total)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any total and participant count, an equal split sums to the
    /// total exactly and no two shares differ by more than one cent.
    #[test]
    fn prop_equal_split_exact_and_fair(
        total in total_cents(),
        count in participant_count(),
    ) {
        let participants = members(count);
        let shares = allocate(Money::from_cents(total), &participants, &SplitSpec::Equal).unwrap();

        assert_allocation_invariants(&shares, &participants, total);

        let min = shares.iter().map(|s| s.amount.cents()).min().unwrap();
        let max = shares.iter().map(|s| s.amount.cents()).max().unwrap();
        prop_assert!(max - min <= 1, "shares differ by more than a cent: {min}..{max}");
    }

    /// Equal splits are deterministic: identical input, identical output.
    #[test]
    fn prop_equal_split_deterministic(
        total in total_cents(),
        count in participant_count(),
    ) {
        let participants = members(count);
        let first = allocate(Money::from_cents(total), &participants, &SplitSpec::Equal).unwrap();
        let second = allocate(Money::from_cents(total), &participants, &SplitSpec::Equal).unwrap();
        prop_assert_eq!(first, second);
    }

    /// For any percentage partition summing to exactly 100.0%, the
    /// allocated shares sum to the total exactly.
    #[test]
    fn prop_percentage_split_exact(
        total in total_cents(),
        (count, parts) in participant_count().prop_flat_map(|n| (Just(n), percent_partition(n))),
    ) {
        let participants = members(count);
        let entries: Vec<(MemberId, Percent)> = participants
            .iter()
            .zip(&parts)
            .map(|(&m, &tenths)| (m, Percent::from_tenths(tenths).unwrap()))
            .collect();

        let shares = allocate(
            Money::from_cents(total),
            &participants,
            &SplitSpec::Percentage(entries),
        )
        .unwrap();

        assert_allocation_invariants(&shares, &participants, total);
    }

    /// Any percentage partition off by a tenth is rejected.
    #[test]
    fn prop_percentage_split_rejects_inexact_sum(
        total in total_cents(),
        (count, mut parts) in (2usize..9).prop_flat_map(|n| (Just(n), percent_partition(n))),
        off_by in prop_oneof![Just(-1i32), Just(1i32)],
    ) {
        // Nudge one entry so the sum is 99.9% or 100.1%.
        let index = parts.iter().position(|&p| {
            let nudged = i32::from(p) + off_by;
            (0..=1000).contains(&nudged)
        }).unwrap();
        let nudged = u16::try_from(i32::from(parts[index]) + off_by).unwrap();
        parts[index] = nudged;

        let participants = members(count);
        let entries: Vec<(MemberId, Percent)> = participants
            .iter()
            .zip(&parts)
            .map(|(&m, &tenths)| (m, Percent::from_tenths(tenths).unwrap()))
            .collect();

        let result = allocate(
            Money::from_cents(total),
            &participants,
            &SplitSpec::Percentage(entries),
        );
        prop_assert!(result.is_err(), "inexact percentage sum must be rejected");
    }

    /// A custom split echoes the provided amounts whenever they sum to
    /// the total.
    #[test]
    fn prop_custom_split_echoes_amounts(
        parts in prop::collection::vec(0i64..1_000_000, 1..9),
    ) {
        let total: i64 = parts.iter().sum();
        let participants = members(parts.len());
        let entries: Vec<(MemberId, Money)> = participants
            .iter()
            .zip(&parts)
            .map(|(&m, &cents)| (m, Money::from_cents(cents)))
            .collect();

        let shares = allocate(
            Money::from_cents(total),
            &participants,
            &SplitSpec::Custom(entries),
        )
        .unwrap();

        assert_allocation_invariants(&shares, &participants, total);
        for (share, &cents) in shares.iter().zip(&parts) {
            prop_assert_eq!(share.amount.cents(), cents);
        }
    }

    /// Itemized splits stay cent-exact for any item list whose prices
    /// sum to the total, with every item shared by every participant.
    #[test]
    fn prop_itemized_split_exact(
        prices in prop::collection::vec(1i64..100_000, 1..6),
        count in participant_count(),
        drift in -1i64..=1,
    ) {
        let participants = members(count);
        let items: Vec<Item> = prices
            .iter()
            .enumerate()
            .map(|(i, &cents)| Item {
                name: format!("item-{i}"),
                price: Money::from_cents(cents),
                assignees: participants.clone(),
            })
            .collect();

        let item_sum: i64 = prices.iter().sum();
        let total = item_sum + drift;

        let shares = allocate(
            Money::from_cents(total),
            &participants,
            &SplitSpec::Itemized(items),
        )
        .unwrap();

        assert_allocation_invariants(&shares, &participants, total);
    }
}
