//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The catalog API sends prices as JSON numbers:                          │
//! │    "sellingPrice": 1249.9                                               │
//! │                                                                         │
//! │  Stored as f64, 1249.9 * 100 = 124989.99999999999  ❌                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    Parse once at the boundary, round to the nearest paisa,             │
//! │    and never touch floating point again.                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use saree_core::money::Money;
//!
//! let mrp = Money::from_paise(149_900); // ₹1499.00
//! let selling = Money::from_rupees_paise(1249, 50);
//!
//! assert_eq!(mrp.to_string(), "₹1499.00");
//! assert_eq!(mrp.label_amount(), "1499");
//! assert_eq!(selling.label_amount(), "1249.50");
//! assert_eq!((mrp - selling).paise(), 24_950);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::ValidationError;
use crate::CURRENCY_SYMBOL;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for returns and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Wire format**: JSON number of rupees, matching the catalog API
///
/// ## Where Money is Used
/// ```text
/// CatalogProduct.sellingPrice ──┐
///                               ├──► PrintableItem.price ──► "Price: ₹1249.50"
/// CatalogProduct.mrp ───────────┴──► PrintableItem.reference_price ──► "MRP: ₹1499"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use saree_core::money::Money;
    ///
    /// let price = Money::from_paise(149_950); // ₹1499.50
    /// assert_eq!(price.paise(), 149_950);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts, only the rupee part should be negative:
    /// `from_rupees_paise(-5, 50)` = -₹5.50.
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Amount as printed on a label, without the currency symbol.
    ///
    /// Whole rupees print bare (`1499`), anything with paise prints two
    /// decimals (`1499.50`).
    ///
    /// ## Example
    /// ```rust
    /// use saree_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(89_900).label_amount(), "899");
    /// assert_eq!(Money::from_paise(89_905).label_amount(), "899.05");
    /// ```
    pub fn label_amount(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        if self.paise_part() == 0 {
            format!("{}{}", sign, self.rupees().abs())
        } else {
            format!("{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
        }
    }

    /// Parses a rupee amount such as `"1499"`, `"1249.5"` or `"₹ 899.99"`.
    ///
    /// More than two decimal places round half away from zero on the third.
    ///
    /// ## Example
    /// ```rust
    /// use saree_core::money::Money;
    ///
    /// assert_eq!(Money::parse_rupees("1249.5").unwrap().paise(), 124_950);
    /// assert_eq!(Money::parse_rupees("₹ 10.005").unwrap().paise(), 1_001);
    /// assert!(Money::parse_rupees("12a").is_err());
    /// ```
    pub fn parse_rupees(input: &str) -> Result<Money, ValidationError> {
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a rupee amount", input),
        };

        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix(CURRENCY_SYMBOL)
            .unwrap_or(trimmed)
            .trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let rupees: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let mut frac_digits = frac.chars().filter_map(|c| c.to_digit(10)).map(i64::from);
        let tens = frac_digits.next().unwrap_or(0);
        let ones = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().map(|d| d >= 5).unwrap_or(false);

        let mut paise = rupees
            .checked_mul(100)
            .and_then(|p| p.checked_add(tens * 10 + ones))
            .ok_or_else(invalid)?;
        if round_up {
            paise += 1;
        }

        Ok(Money(if negative { -paise } else { paise }))
    }

    /// Converts a JSON float of rupees to paise, rounding to the nearest paisa.
    fn from_rupee_float(value: f64) -> Option<Money> {
        if !value.is_finite() {
            return None;
        }
        let paise = (value * 100.0).round();
        if paise.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(paise as i64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the rupee symbol and two decimals: `₹1499.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}{}.{:02}",
            sign,
            CURRENCY_SYMBOL,
            self.rupees().abs(),
            self.paise_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde (rupees on the wire)
// =============================================================================

/// Serializes as a JSON number of rupees: whole amounts as integers,
/// fractional amounts as floats.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.paise_part() == 0 {
            serializer.serialize_i64(self.rupees())
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a rupee amount as a number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                v.checked_mul(100)
                    .map(Money)
                    .ok_or_else(|| E::custom(format!("amount out of range: {}", v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(|v| v.checked_mul(100))
                    .map(Money)
                    .ok_or_else(|| E::custom(format!("amount out of range: {}", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::from_rupee_float(v)
                    .ok_or_else(|| E::custom(format!("invalid amount: {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                Money::parse_rupees(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
