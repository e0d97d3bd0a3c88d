//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price is stored and summed as whole cents.                     │
//! │    199.99 × 3 = 59997 cents = exactly 599.97                            │
//! │                                                                         │
//! │  Floats exist only at the edge: request bodies carry decimal prices,    │
//! │  so `from_display` / `to_display` convert once at the boundary.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::Money;
//!
//! let price = Money::from_cents(19999); // 199.99
//! let total: Money = price * 3;
//! assert_eq!(total.cents(), 59997);
//! assert_eq!(total.to_display(), 599.97);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Plenty of headroom for cart totals
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type:
/// item prices, line subtotals, and cart totals are all exact cents.
/// Rounding happens exactly once, when a value leaves for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount (e.g. `199.99` from a request body) to cents.
    ///
    /// This is the ONLY place a float enters the money domain. The value is
    /// rounded to the nearest cent, so `199.99` becomes exactly `19999` even
    /// though the f64 representation is `199.98999...`.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// assert_eq!(Money::from_display(199.99).cents(), 19999);
    /// assert_eq!(Money::from_display(0.1).cents(), 10);
    /// ```
    #[inline]
    pub fn from_display(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    /// Converts cents back to a decimal amount for display / JSON output.
    ///
    /// Two-decimal amounts survive the round trip exactly: an i64 cents
    /// value divided by 100.0 is the closest f64 to the true decimal, which
    /// serializes back to the same two-decimal string.
    #[inline]
    pub fn to_display(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // 2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // 8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. API responses use `to_display`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (cart totals).
impl Sum for Money {
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
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_from_display_rounds_to_nearest_cent() {
        assert_eq!(Money::from_display(199.99).cents(), 19999);
        assert_eq!(Money::from_display(0.1).cents(), 10);
        assert_eq!(Money::from_display(0.0).cents(), 0);
        assert_eq!(Money::from_display(1234.56).cents(), 123456);
    }

    /// Critical test: three units of a 199.99 item sum to exactly 599.97.
    /// Floating point would give 599.9699999999999; integer cents do not.
    #[test]
    fn test_exact_sum_of_repeated_price() {
        let price = Money::from_display(199.99);
        let total: Money = price * 3;
        assert_eq!(total.cents(), 59997);
        assert_eq!(total.to_display(), 599.97);
    }

    #[test]
    fn test_sum_iterator() {
        let lines = [Money::from_cents(100), Money::from_cents(250), Money::from_cents(49)];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.cents(), 399);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }
}
