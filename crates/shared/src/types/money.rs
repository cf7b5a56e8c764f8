//! Money type backed by integer minor units (cents).
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts live as an `i64` count of cents; decimal text only exists at
//! the API boundary, where it is parsed through `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of minor units in one major unit.
const CENTS_PER_UNIT: i64 = 100;

/// Arithmetic exceeded the representable range of `Money`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Money arithmetic overflowed the representable range")]
pub struct OverflowError;

/// Failed to parse a decimal string into `Money`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    /// The text is not a valid decimal number.
    #[error("Invalid amount: {0:?}")]
    InvalidDecimal(String),
    /// The amount carries more than two fractional digits.
    #[error("Amount {0} has more than two fractional digits")]
    TooPrecise(Decimal),
    /// The amount does not fit the representable range.
    #[error("Amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// A monetary amount in a group's single currency, stored as whole cents.
///
/// All arithmetic is integer arithmetic; no operation ever produces a
/// fractional cent. Overflow-prone operations return `OverflowError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` from a raw count of cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw count of cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns `OverflowError` if the sum exceeds the representable range.
    pub fn checked_add(self, other: Self) -> Result<Self, OverflowError> {
        self.0.checked_add(other.0).map(Self).ok_or(OverflowError)
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns `OverflowError` if the difference exceeds the representable range.
    pub fn checked_sub(self, other: Self) -> Result<Self, OverflowError> {
        self.0.checked_sub(other.0).map(Self).ok_or(OverflowError)
    }

    /// Multiplies by the ratio `numerator / denominator`, rounding to the
    /// nearest cent (ties away from zero).
    ///
    /// The intermediate product is computed in 128 bits, so any callers
    /// staying within the i64 cent range cannot overflow mid-computation.
    ///
    /// # Errors
    ///
    /// Returns `OverflowError` if the denominator is zero or the result
    /// does not fit the representable range.
    pub fn multiply_by_ratio(self, numerator: i64, denominator: i64) -> Result<Self, OverflowError> {
        if denominator == 0 {
            return Err(OverflowError);
        }
        let mut product = i128::from(self.0) * i128::from(numerator);
        let mut den = i128::from(denominator);
        if den < 0 {
            product = -product;
            den = -den;
        }
        let magnitude = (product.unsigned_abs() + den.unsigned_abs() / 2) / den.unsigned_abs();
        let magnitude = i128::try_from(magnitude).map_err(|_| OverflowError)?;
        let rounded = if product < 0 { -magnitude } else { magnitude };
        i64::try_from(rounded).map(Self).map_err(|_| OverflowError)
    }

    /// Sums an iterator of amounts with overflow checking.
    ///
    /// # Errors
    ///
    /// Returns `OverflowError` if the running total exceeds the representable range.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Result<Self, OverflowError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }

    /// Parses a `Money` from a `Decimal` with at most two fractional digits.
    ///
    /// # Errors
    ///
    /// Returns `MoneyParseError` if the value is too precise or out of range.
    pub fn try_from_decimal(value: Decimal) -> Result<Self, MoneyParseError> {
        let cents = value
            .checked_mul(Decimal::from(CENTS_PER_UNIT))
            .ok_or(MoneyParseError::OutOfRange(value))?;
        if cents.fract() != Decimal::ZERO {
            return Err(MoneyParseError::TooPrecise(value));
        }
        cents
            .to_i64()
            .map(Self)
            .ok_or(MoneyParseError::OutOfRange(value))
    }

    /// Renders the amount as a `Decimal` with two fractional digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:02}",
            magnitude / CENTS_PER_UNIT.unsigned_abs(),
            magnitude % CENTS_PER_UNIT.unsigned_abs()
        )
    }
}

impl std::str::FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal: Decimal = s
            .trim()
            .parse()
            .map_err(|_| MoneyParseError::InvalidDecimal(s.to_string()))?;
        Self::try_from_decimal(decimal)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents_roundtrip() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert!(!money.is_zero());
        assert!(!money.is_negative());
    }

    #[test]
    fn test_zero() {
        assert!(Money::ZERO.is_zero());
        assert!(!Money::ZERO.is_negative());
        assert!(!Money::ZERO.is_positive());
    }

    #[test]
    fn test_checked_add_and_sub() {
        let a = Money::from_cents(150);
        let b = Money::from_cents(50);
        assert_eq!(a.checked_add(b).unwrap(), Money::from_cents(200));
        assert_eq!(a.checked_sub(b).unwrap(), Money::from_cents(100));
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.checked_add(Money::from_cents(1)), Err(OverflowError));
    }

    #[rstest]
    #[case(1000, 1, 3, 333)] // 10.00 / 3 = 3.33 (0.333... rounds down)
    #[case(1000, 2, 3, 667)] // 6.66... rounds up
    #[case(100, 1, 2, 50)]
    #[case(101, 1, 2, 51)] // 50.5 rounds half-up
    #[case(-101, 1, 2, -51)] // ties away from zero
    #[case(333, 100, 100, 333)]
    fn test_multiply_by_ratio(
        #[case] cents: i64,
        #[case] num: i64,
        #[case] den: i64,
        #[case] expected: i64,
    ) {
        let result = Money::from_cents(cents).multiply_by_ratio(num, den).unwrap();
        assert_eq!(result.cents(), expected);
    }

    #[test]
    fn test_multiply_by_zero_denominator() {
        assert_eq!(
            Money::from_cents(100).multiply_by_ratio(1, 0),
            Err(OverflowError)
        );
    }

    #[test]
    fn test_checked_sum() {
        let amounts = [Money::from_cents(10), Money::from_cents(20), Money::from_cents(30)];
        assert_eq!(Money::checked_sum(amounts).unwrap(), Money::from_cents(60));
    }

    #[rstest]
    #[case("10.00", 1000)]
    #[case("0.01", 1)]
    #[case("3.5", 350)]
    #[case("7", 700)]
    #[case("-0.05", -5)]
    fn test_parse(#[case] text: &str, #[case] cents: i64) {
        let money: Money = text.parse().unwrap();
        assert_eq!(money.cents(), cents);
    }

    #[test]
    fn test_parse_rejects_sub_cent_precision() {
        assert!(matches!(
            "1.005".parse::<Money>(),
            Err(MoneyParseError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "ten dollars".parse::<Money>(),
            Err(MoneyParseError::InvalidDecimal(_))
        ));
    }

    #[rstest]
    #[case(1000, "10.00")]
    #[case(1, "0.01")]
    #[case(0, "0.00")]
    #[case(-5, "-0.05")]
    #[case(123_456, "1234.56")]
    fn test_display_always_two_digits(#[case] cents: i64, #[case] expected: &str) {
        assert_eq!(Money::from_cents(cents).to_string(), expected);
    }

    #[test]
    fn test_try_from_decimal() {
        assert_eq!(
            Money::try_from_decimal(dec!(12.34)).unwrap(),
            Money::from_cents(1234)
        );
        assert!(matches!(
            Money::try_from_decimal(dec!(12.345)),
            Err(MoneyParseError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_serde_uses_decimal_strings() {
        let money = Money::from_cents(1234);
        assert_eq!(serde_json::to_string(&money).unwrap(), "\"12.34\"");
        let parsed: Money = serde_json::from_str("\"12.34\"").unwrap();
        assert_eq!(parsed, money);
    }
}
