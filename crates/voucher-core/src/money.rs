//! # Money Module
//!
//! Provides the `Money` type and the two-tax calculator.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    100 × 9.975 / 100 = 9.974999999999999  → rounds to 9.97  ❌          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Integer Rates                            │
//! │    10000 cents × 9975 (thousandths of a percent) / 100000               │
//! │      = 997.5 cents → 998 cents (half away from zero)  ✅                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use voucher_core::money::Money;
//!
//! let subtotal = Money::parse("12.50").unwrap();
//! assert_eq!(subtotal.cents(), 1250);
//!
//! // Form input that is not a number counts as zero
//! assert_eq!(Money::parse_lenient("abc"), Money::zero());
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Form subtotal ("12.50") ──► Money::parse ──► calculate_taxes           │
/// │                                                   │                     │
/// │                                   Voucher { subtotal, tps, tvq, total } │
/// │                                                   │                     │
/// │             Aging buckets ◄───────────────────────┼──► Invoice totals   │
/// │                                                   │                     │
/// │                                  CSV cells ("12.50") via to_amount()    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Largest subtotal a voucher may carry: $10,000,000.00.
    ///
    /// Keeps `subtotal + tps + tvq` far inside `i64` at any rate up to 100%.
    pub const MAX_SUBTOTAL: Money = Money(1_000_000_000);

    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use voucher_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal amount ("12", "12.5", "12.345") into cents.
    ///
    /// Amounts with more than two decimals are rounded half away from zero.
    /// Returns `None` for empty or non-numeric input.
    pub fn parse(input: &str) -> Option<Money> {
        let value = Decimal::from_str(input.trim()).ok()?;
        let cents = value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::from(100))?
            .to_i64()?;
        Some(Money(cents))
    }

    /// Parses like [`Money::parse`] but treats unparseable input as zero.
    ///
    /// Mirrors how the voucher form previews taxes while the subtotal field
    /// is still empty or half-typed.
    pub fn parse_lenient(input: &str) -> Money {
        Money::parse(input).unwrap_or_default()
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Formats the amount with exactly two decimals and no currency symbol.
    ///
    /// This is the format of every currency cell in exported CSV files.
    ///
    /// ```rust
    /// use voucher_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(11498).to_amount(), "114.98");
    /// assert_eq!(Money::from_cents(5).to_amount(), "0.05");
    /// assert_eq!(Money::from_cents(-550).to_amount(), "-5.50");
    /// ```
    pub fn to_amount(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }

    /// Calculates tax at `rate`, rounding half away from zero to the cent.
    ///
    /// ## Implementation
    /// Rates are thousandths of a percent, so the exact tax in cents is
    /// `amount_cents * rate / 100_000`. The remainder decides the rounding.
    ///
    /// ```rust
    /// use voucher_core::money::Money;
    /// use voucher_core::types::TaxRate;
    ///
    /// let tax = Money::from_cents(10_000).calculate_tax(TaxRate::from_percentage(9.975));
    /// assert_eq!(tax.cents(), 998); // 9.975 → 9.98
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large subtotals from overflowing the product
        let numerator = self.0 as i128 * rate.milli_percent() as i128;
        Money::from_cents(saturate(div_round_half_away(numerator, 100_000)))
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

fn saturate(cents: i128) -> i64 {
    i64::try_from(cents).unwrap_or(if cents < 0 { i64::MIN } else { i64::MAX })
}

/// Integer division rounding half away from zero. `divisor` must be positive.
fn div_round_half_away(numerator: i128, divisor: i128) -> i128 {
    let quotient = numerator / divisor;
    let remainder = numerator % divisor;
    if remainder.abs() * 2 >= divisor {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

// =============================================================================
// Tax Calculator
// =============================================================================

/// Result of applying TPS and TVQ to a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub subtotal: Money,
    pub tps: Money,
    pub tvq: Money,
    pub total: Money,
}

/// Computes both sales taxes and the grand total for a subtotal.
///
/// ## Rules
/// - `tps = round2(subtotal × tps% / 100)`
/// - `tvq = round2(subtotal × tvq% / 100)`
/// - `total = subtotal + tps + tvq`
///
/// Each tax is rounded on its own before the sum, so `total` is always the
/// exact sum of the three displayed amounts. There are no error cases: a
/// subtotal past [`Money::MAX_SUBTOTAL`] is rejected before it gets here, and
/// anything larger saturates instead of wrapping.
///
/// ## User Workflow
/// ```text
/// Subtotal: 100.00
///      │
///      ▼
/// calculate_taxes(TPS 5%, TVQ 9.975%) ← THIS FUNCTION
///      │
///      ▼
/// TPS 5.00 + TVQ 9.98 → Total 114.98
/// ```
pub fn calculate_taxes(subtotal: Money, tps_rate: TaxRate, tvq_rate: TaxRate) -> TaxBreakdown {
    let tps = subtotal.calculate_tax(tps_rate);
    let tvq = subtotal.calculate_tax(tvq_rate);
    TaxBreakdown {
        subtotal,
        tps,
        tvq,
        total: subtotal
            .checked_add(tps)
            .and_then(|sum| sum.checked_add(tvq))
            .unwrap_or(Money(i64::MAX)),
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with a dollar sign, for terminal output.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Report and invoice sums saturate at the `i64` bounds instead of wrapping.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
