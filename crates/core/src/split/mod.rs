//! Converting an expense total into exact per-participant shares.
//!
//! This module implements the split allocator:
//! - Equal splits with deterministic remainder distribution
//! - Percentage splits with drift correction
//! - Custom per-participant amounts
//! - Itemized splits divided per item across assignees
//!
//! For every mode the shares sum to the total cent-exactly and every
//! participant appears exactly once in the output.

pub mod allocate;
pub mod types;

#[cfg(test)]
mod allocate_props;

pub use allocate::allocate;
pub use types::{Item, Percent, PercentError, Share, SplitMode, SplitSpec};
