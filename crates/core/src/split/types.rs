//! Split domain types: modes, parameters, and allocated shares.

use divvy_shared::types::{MemberId, Money};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tenths of a percent in a whole (100.0%).
pub(crate) const WHOLE_TENTHS: u32 = 1000;

/// A percentage with one decimal place of precision, held as integer
/// tenths of a percent so that 33.3% is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(u16);

/// Failed to construct a `Percent`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PercentError {
    /// The value is outside 0-100.
    #[error("Percentage must be between 0 and 100 (got {0})")]
    OutOfRange(Decimal),
    /// The value carries more than one decimal place.
    #[error("Percentage {0} has more than one decimal place")]
    TooPrecise(Decimal),
}

impl Percent {
    /// Exactly 100.0%.
    pub const ONE_HUNDRED: Self = Self(WHOLE_TENTHS as u16);

    /// Creates a percentage from integer tenths of a percent (0-1000).
    #[must_use]
    pub const fn from_tenths(tenths: u16) -> Option<Self> {
        if tenths <= WHOLE_TENTHS as u16 {
            Some(Self(tenths))
        } else {
            None
        }
    }

    /// Creates a percentage from a decimal value with at most one
    /// decimal place, e.g. `33.3`.
    ///
    /// # Errors
    ///
    /// Returns `PercentError` if the value is out of range or too precise.
    pub fn try_from_decimal(value: Decimal) -> Result<Self, PercentError> {
        let tenths = value
            .checked_mul(Decimal::from(10))
            .ok_or(PercentError::OutOfRange(value))?;
        if tenths.fract() != Decimal::ZERO {
            return Err(PercentError::TooPrecise(value));
        }
        tenths
            .to_u16()
            .and_then(Self::from_tenths)
            .ok_or(PercentError::OutOfRange(value))
    }

    /// Returns the value in tenths of a percent.
    #[must_use]
    pub const fn tenths(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}%", self.0 / 10, self.0 % 10)
    }
}

/// How an expense total is divided among its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Even split with deterministic remainder distribution.
    Equal,
    /// Split by per-participant percentages summing to 100.0.
    Percentage,
    /// Explicit per-participant amounts summing to the total.
    Custom,
    /// Per-item prices divided among each item's assignees.
    #[serde(rename = "items")]
    Itemized,
}

/// A line item in an itemized expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Item name as entered on the receipt.
    pub name: String,
    /// Item price; divided evenly among the assignees.
    pub price: Money,
    /// The participants this item is assigned to.
    pub assignees: Vec<MemberId>,
}

/// Mode-specific split parameters.
///
/// Parameter lists preserve input order; the allocator's remainder and
/// drift rules are defined in terms of that order, which is what makes
/// recomputation reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSpec {
    /// Equal split across the participant set.
    Equal,
    /// Percentage per participant; must cover the participant set and
    /// sum to exactly 100.0%.
    Percentage(Vec<(MemberId, Percent)>),
    /// Exact amount per participant; must cover the participant set and
    /// sum to exactly the total.
    Custom(Vec<(MemberId, Money)>),
    /// Ordered list of items, each assigned to one or more participants.
    Itemized(Vec<Item>),
}

impl SplitSpec {
    /// Returns the mode label for this parameter set.
    #[must_use]
    pub const fn mode(&self) -> SplitMode {
        match self {
            Self::Equal => SplitMode::Equal,
            Self::Percentage(_) => SplitMode::Percentage,
            Self::Custom(_) => SplitMode::Custom,
            Self::Itemized(_) => SplitMode::Itemized,
        }
    }
}

/// A participant's computed portion of an expense total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// The participant owing this portion.
    pub participant: MemberId,
    /// The portion, in cents.
    pub amount: Money,
}
