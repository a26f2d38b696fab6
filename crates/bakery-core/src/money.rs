//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Decimal On The Wire, Integer In Memory               │
//! │                                                                         │
//! │  Backend JSON            Parse boundary              Console            │
//! │  ────────────            ──────────────              ───────            │
//! │  "costPrice": 12.5  ───► Money::from_decimal ──────► Money(1250)        │
//! │                          (round half away                               │
//! │                           from zero, 2 dp)                              │
//! │                                                                         │
//! │  After the boundary every sum, product and comparison is integer math. │
//! │  Floats only reappear when a request body is serialized.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bakery_core::money::Money;
//!
//! let croissant = Money::from_paise(4550); // ₹45.50
//! let dozen = croissant.multiply_quantity(12).unwrap();
//! assert_eq!(dozen.paise(), 54600);
//! assert_eq!(croissant.multiply_quantity(i64::MAX), None);
//! assert_eq!(dozen.to_string(), "₹546.00");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Number of minor units (paise) in one rupee.
const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: manual income corrections can be negative deltas
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde as a decimal number**: the backend speaks `12.5`, not `1250`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// ```rust
    /// use bakery_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 5).paise(), 1005);
    /// assert_eq!(Money::from_major_minor(-5, 50).paise(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MINOR_PER_MAJOR - minor)
        } else {
            Money(major * MINOR_PER_MAJOR + minor)
        }
    }

    /// Converts a decimal amount received from the API.
    ///
    /// Rounds half away from zero to two decimal places. Non-finite input
    /// (NaN, infinity) is treated as zero.
    ///
    /// ```rust
    /// use bakery_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(12.5).paise(), 1250);
    /// assert_eq!(Money::from_decimal(0.125).paise(), 13);
    /// assert_eq!(Money::from_decimal(-2.005).paise(), -201);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // Nudge by a relative epsilon so 0.125 (stored as 0.12499..) still rounds up.
        let scaled = amount * MINOR_PER_MAJOR as f64;
        let nudged = scaled + scaled.signum() * scaled.abs() * f64::EPSILON * 4.0;
        Money(nudged.round() as i64)
    }

    /// Returns the value as a decimal number, for request bodies only.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Sourdough ₹120.00
    /// Quantity: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: ₹360.00
    /// ```
    ///
    /// `None` when the line total does not fit in paise.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Addition that reports overflow instead of panicking.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Splits a line total back into a unit price.
    ///
    /// Bill lines only carry the line cost, so the detail view derives the
    /// unit cost. Integer division truncates toward zero; a zero quantity
    /// (or a quotient that does not fit) yields zero.
    pub const fn divide_by_quantity(&self, qty: i64) -> Self {
        match self.0.checked_div(qty) {
            Some(paise) => Money(paise),
            None => Money(0),
        }
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Display
// =============================================================================

/// Formats as `₹1,234.50` (negative: `-₹1,234.50`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let rupees = (self.0 / MINOR_PER_MAJOR).unsigned_abs().to_string();

        let mut grouped = String::with_capacity(rupees.len() + rupees.len() / 3);
        for (i, ch) in rupees.chars().enumerate() {
            if i > 0 && (rupees.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}₹{}.{:02}", sign, grouped, self.paise_part())
    }
}

// =============================================================================
// Serde (decimal number on the wire)
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Ok(Money::from_decimal(amount))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
