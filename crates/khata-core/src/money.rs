//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  Worse for this system: product identity is keyed on (barcode, MRP) │
//! │  within a tolerance. Epsilon-comparing floats makes "same price"    │
//! │  ambiguous and produces phantom SKUs.                               │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Paisa                                        │
//! │    Rs 10.99 is stored as 1099 paisa. Tolerance matching is plain    │
//! │    integer subtraction - exact, total, unambiguous.                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khata_core::money::Money;
//!
//! // Create from paisa (preferred)
//! let mrp = Money::from_paisa(1099); // Rs 10.99
//!
//! // Arithmetic operations
//! let doubled = mrp * 2;                       // Rs 21.98
//! let total = mrp + Money::from_paisa(500);    // Rs 15.99
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paisa).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values occur in profit deltas and refunds
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support so report rows serialize as integers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paisa (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// let mrp = Money::from_paisa(1099); // Rs 10.99
    /// assert_eq!(mrp.paisa(), 1099);
    /// ```
    #[inline]
    pub const fn from_paisa(paisa: i64) -> Self {
        Money(paisa)
    }

    /// Creates a Money value from rupees and paisa.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_rupees(-5, 50)` is Rs -5.50, not Rs -4.50.
    #[inline]
    pub const fn from_rupees(rupees: i64, paisa: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paisa)
        } else {
            Money(rupees * 100 + paisa)
        }
    }

    /// Returns the value in paisa.
    #[inline]
    pub const fn paisa(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paisa portion (always 0-99, absolute).
    #[inline]
    pub const fn paisa_part(&self) -> i64 {
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Absolute distance between two amounts, in paisa.
    ///
    /// This is the comparison product resolution runs on: two MRPs are "the
    /// same price point" when `a.abs_diff(b) <= MRP_TOLERANCE_PAISA`.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// let a = Money::from_paisa(1099);
    /// let b = Money::from_paisa(1100);
    /// assert_eq!(a.abs_diff(b), 1);
    /// ```
    #[inline]
    pub const fn abs_diff(&self, other: Money) -> i64 {
        (self.0 - other.0).abs()
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// let rate = Money::from_paisa(299); // Rs 2.99
    /// assert_eq!(rate.multiply_quantity(3).paisa(), 897); // Rs 8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Builds a Money value from a fractional paisa amount, rounding to the
    /// nearest paisa (half away from zero).
    ///
    /// Derived unit rates (a weighted average, a per-unit FIFO cost) are
    /// inherently fractional; this is the single place a float re-enters
    /// integer money.
    pub fn from_paisa_rounded(paisa: f64) -> Self {
        Money(paisa.round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs; report consumers format for display themselves.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rs {}.{:02}", sign, self.rupees().abs(), self.paisa_part())
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

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paisa() {
        let money = Money::from_paisa(1099);
        assert_eq!(money.paisa(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paisa_part(), 99);
    }

    #[test]
    fn test_from_rupees() {
        assert_eq!(Money::from_rupees(10, 99).paisa(), 1099);
        assert_eq!(Money::from_rupees(-5, 50).paisa(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paisa(1099)), "Rs 10.99");
        assert_eq!(format!("{}", Money::from_paisa(500)), "Rs 5.00");
        assert_eq!(format!("{}", Money::from_paisa(-550)), "-Rs 5.50");
        assert_eq!(format!("{}", Money::from_paisa(0)), "Rs 0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paisa(1000);
        let b = Money::from_paisa(500);

        assert_eq!((a + b).paisa(), 1500);
        assert_eq!((a - b).paisa(), 500);
        assert_eq!((a * 3i64).paisa(), 3000);
    }

    #[test]
    fn test_abs_diff_is_symmetric() {
        let a = Money::from_paisa(1099);
        let b = Money::from_paisa(1101);
        assert_eq!(a.abs_diff(b), 2);
        assert_eq!(b.abs_diff(a), 2);
        assert_eq!(a.abs_diff(a), 0);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 50].iter().map(|&p| Money::from_paisa(p)).sum();
        assert_eq!(total.paisa(), 400);
    }

    #[test]
    fn test_from_paisa_rounded() {
        assert_eq!(Money::from_paisa_rounded(549.5).paisa(), 550);
        assert_eq!(Money::from_paisa_rounded(549.4).paisa(), 549);
        assert_eq!(Money::from_paisa_rounded(-549.5).paisa(), -550);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_paisa(100).is_positive());
        assert!(Money::from_paisa(-100).is_negative());
    }
}
