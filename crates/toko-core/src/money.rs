//! # Money Module
//!
//! Provides the `Money` type for rupiah amounts.
//!
//! ## Integer Rupiah
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  The API sends amounts as decimal strings: "50000.00"           │
//! │                                                                 │
//! │  IDR has no minor unit in practice, so amounts are stored as    │
//! │  whole rupiah in an i64. The fractional part of the wire value  │
//! │  is discarded on parse and re-emitted as ".00" on serialize.    │
//! │                                                                 │
//! │  Display follows the id-ID locale with zero decimal places:     │
//! │    100000  →  "Rp 100.000"                                      │
//! │    -5000   →  "-Rp 5.000"                                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole rupiah.
///
/// Signed so refunds and corrections can be represented. All arithmetic is
/// integer arithmetic; there is no floating point anywhere in the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses a wire amount.
    ///
    /// ## Accepted Forms
    /// - `"50000.00"` (decimal string, fraction discarded)
    /// - `"50000"` (integer string)
    /// - leading `-` for negative amounts
    ///
    /// ## Example
    /// ```rust
    /// use toko_core::Money;
    ///
    /// assert_eq!(Money::parse("50000.00").unwrap().rupiah(), 50_000);
    /// assert_eq!(Money::parse("-250").unwrap().rupiah(), -250);
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        let integral = trimmed.split('.').next().unwrap_or(trimmed);

        if integral.is_empty() || integral == "-" {
            return Err(CoreError::InvalidAmount {
                value: value.to_string(),
            });
        }

        integral
            .parse::<i64>()
            .map(Money)
            .map_err(|_| CoreError::InvalidAmount {
                value: value.to_string(),
            })
    }

    /// Multiplies by a quantity (line totals).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Formats as an id-ID currency string, e.g. `"Rp 100.000"`.
    ///
    /// Zero decimal places, `.` as the thousands separator. This is the
    /// formatter contract the storefront displays rely on.
    pub fn format(&self) -> String {
        let digits = self.0.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if self.0 < 0 {
            format!("-Rp {}", grouped)
        } else {
            format!("Rp {}", grouped)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Serde: decimal-string wire format
// =============================================================================

/// Serializes as the wire decimal string, e.g. `"50000.00"`.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}.00", self.0))
    }
}

/// Deserializes from a decimal string or a bare JSON number.
///
/// The API emits strings, but some endpoints (and older revisions) emit
/// numbers; both are accepted.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or number amount")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                Money::parse(v).map_err(|_| E::custom(format!("invalid amount: '{}'", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money::from_rupiah(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map(Money::from_rupiah)
                    .map_err(|_| E::custom("amount out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Ok(Money::from_rupiah(v.trunc() as i64))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_string() {
        assert_eq!(Money::parse("50000.00").unwrap().rupiah(), 50_000);
        assert_eq!(Money::parse("50000").unwrap().rupiah(), 50_000);
        assert_eq!(Money::parse("0.00").unwrap().rupiah(), 0);
        assert_eq!(Money::parse("-2500.00").unwrap().rupiah(), -2_500);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("-").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse(".50").is_err());
    }

    #[test]
    fn test_format_idr() {
        assert_eq!(Money::from_rupiah(100_000).format(), "Rp 100.000");
        assert_eq!(Money::from_rupiah(1_500).format(), "Rp 1.500");
        assert_eq!(Money::from_rupiah(999).format(), "Rp 999");
        assert_eq!(Money::from_rupiah(1_234_567).format(), "Rp 1.234.567");
        assert_eq!(Money::from_rupiah(0).format(), "Rp 0");
        assert_eq!(Money::from_rupiah(-5_000).format(), "-Rp 5.000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(50_000);
        let b = Money::from_rupiah(25_000);

        assert_eq!((a + b).rupiah(), 75_000);
        assert_eq!((a - b).rupiah(), 25_000);
        assert_eq!((a * 2).rupiah(), 100_000);
        assert_eq!(a.multiply_quantity(3).rupiah(), 150_000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [10_000, 20_000, 5_000]
            .iter()
            .map(|r| Money::from_rupiah(*r))
            .sum();
        assert_eq!(total.rupiah(), 35_000);
    }

    #[test]
    fn test_serde_round_trip() {
        let money = Money::from_rupiah(50_000);
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"50000.00\"");

        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
    }

    #[test]
    fn test_deserialize_number_forms() {
        let from_int: Money = serde_json::from_str("50000").unwrap();
        assert_eq!(from_int.rupiah(), 50_000);

        let from_float: Money = serde_json::from_str("50000.75").unwrap();
        assert_eq!(from_float.rupiah(), 50_000);
    }
}
