//! Folding the event log into pairwise net balances.
//!
//! This module implements:
//! - The group event log (expenses and settlements)
//! - Balance aggregation as a pure, order-independent fold
//! - Greedy debt simplification into suggested payments
//!
//! Balances are derived, never stored: they are always a pure function
//! of the full event log, so recomputation is safe to retry or run
//! speculatively.

pub mod balance;
pub mod simplify;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::{compute_balances, current_owed};
pub use simplify::{simplify, SettlementSuggestion};
pub use types::{GroupEvent, NetBalance};
