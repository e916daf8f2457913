//! # Domain Types
//!
//! Core domain types used throughout Voucher Desk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  VoucherDraft   │   │   NewVoucher    │   │    Voucher      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  date           │──►│  + tps/tvq      │──►│  + id (UUID)    │       │
//! │  │  receipt        │   │  + total        │   │  + status       │       │
//! │  │  restaurant     │   │  + invoice #    │   │  + timestamps   │       │
//! │  │  airline        │   └─────────────────┘   └────────┬────────┘       │
//! │  │  subtotal       │       price()             insert │ archive        │
//! │  └─────────────────┘                                  ▼                │
//! │                                              ┌─────────────────┐       │
//! │  ┌─────────────────┐   ┌─────────────────┐   │ ArchivedVoucher │       │
//! │  │    TaxRate      │   │  VoucherStatus  │   └─────────────────┘       │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  milli-percent  │   │  Unbilled       │   RestaurantRegistry        │
//! │  │  9975 = 9.975%  │   │  Invoiced       │   AirlineRegistry           │
//! │  └─────────────────┘   │  Paid           │   User / Role               │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every stored voucher has:
//! - `id`: UUID v4, assigned by the store on insert
//! - Business key: `(receipt, restaurant)`, unique across active vouchers

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::invoice::generate_invoice_number;
use crate::money::{calculate_taxes, Money, TaxBreakdown};
use crate::{DEFAULT_TPS_PERCENT, DEFAULT_TVQ_PERCENT};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in thousandths of a percent.
///
/// ## Why Thousandths?
/// The Quebec TVQ is 9.975%, three decimals of a percent. Basis points
/// (hundredths) cannot hold it exactly; milli-percent can:
/// 9975 = 9.975%, 5000 = 5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Largest accepted rate (100%).
    pub const MAX: TaxRate = TaxRate(100_000);

    /// Creates a tax rate from thousandths of a percent.
    #[inline]
    pub const fn from_milli_percent(milli: u32) -> Self {
        TaxRate(milli)
    }

    /// Creates a tax rate from a percentage (for convenience).
    ///
    /// Negative input saturates to zero. Use [`TaxRate::try_from_percentage`]
    /// for operator input.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 1000.0).round() as u32)
    }

    /// Creates a tax rate from a percentage, rejecting values outside 0..=100.
    pub fn try_from_percentage(field: &str, pct: f64) -> Result<Self, ValidationError> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(TaxRate::from_percentage(pct))
    }

    /// Returns the rate in thousandths of a percent.
    #[inline]
    pub const fn milli_percent(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Shows the shortest exact percentage: `5%`, `9.975%`, `7.5%`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 1000;
        let frac = self.0 % 1000;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else {
            let digits = format!("{:03}", frac);
            write!(f, "{}.{}%", whole, digits.trim_end_matches('0'))
        }
    }
}

// =============================================================================
// Tax Settings
// =============================================================================

/// The global TPS/TVQ pair. Exactly one instance exists per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSettings {
    pub tps: TaxRate,
    pub tvq: TaxRate,
}

impl TaxSettings {
    /// Applies both rates to a subtotal.
    #[inline]
    pub fn apply(&self, subtotal: Money) -> TaxBreakdown {
        calculate_taxes(subtotal, self.tps, self.tvq)
    }
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            tps: TaxRate::from_percentage(DEFAULT_TPS_PERCENT),
            tvq: TaxRate::from_percentage(DEFAULT_TVQ_PERCENT),
        }
    }
}

// =============================================================================
// Voucher Status
// =============================================================================

/// Billing status of a voucher.
///
/// ```text
/// Unbilled ──invoice generate──► Invoiced ──mark paid──► Paid
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum VoucherStatus {
    /// Accepted from the passenger, not yet billed to the airline.
    Unbilled,
    /// Included in a generated invoice.
    Invoiced,
    /// The airline settled the invoice.
    Paid,
}

impl VoucherStatus {
    /// Returns the stored/displayed name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            VoucherStatus::Unbilled => "Unbilled",
            VoucherStatus::Invoiced => "Invoiced",
            VoucherStatus::Paid => "Paid",
        }
    }
}

impl Default for VoucherStatus {
    fn default() -> Self {
        VoucherStatus::Unbilled
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoucherStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unbilled" => Ok(VoucherStatus::Unbilled),
            "invoiced" => Ok(VoucherStatus::Invoiced),
            "paid" => Ok(VoucherStatus::Paid),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    "Unbilled".to_string(),
                    "Invoiced".to_string(),
                    "Paid".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Voucher
// =============================================================================

/// One reimbursable restaurant/airline transaction.
///
/// Tax fields are a snapshot of the rates in effect when the voucher was
/// created. Changing the tax settings later never touches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Voucher {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// POS receipt date.
    pub date: NaiveDate,

    /// Receipt number printed by the restaurant's POS.
    pub receipt: String,

    /// Restaurant name (registry key).
    pub restaurant: String,

    /// Airline name (registry key).
    pub airline: String,

    /// Pre-tax amount in cents.
    pub subtotal_cents: i64,

    /// TPS in cents at creation time.
    pub tps_cents: i64,

    /// TVQ in cents at creation time.
    pub tvq_cents: i64,

    /// subtotal + tps + tvq, in cents.
    pub total_cents: i64,

    /// Derived invoice code, e.g. `SUBACD0324`.
    pub invoice_number: String,

    pub status: VoucherStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tps(&self) -> Money {
        Money::from_cents(self.tps_cents)
    }

    #[inline]
    pub fn tvq(&self) -> Money {
        Money::from_cents(self.tvq_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Formats the receipt date as `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// A voucher moved out of the active collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ArchivedVoucher {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub voucher: Voucher,

    /// When the voucher was archived.
    pub archived_at: DateTime<Utc>,
}

// =============================================================================
// Voucher Draft
// =============================================================================

/// Operator input for a new voucher, before any derived field exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherDraft {
    pub date: NaiveDate,
    pub receipt: String,
    pub restaurant: String,
    pub airline: String,
    pub subtotal: Money,
}

impl VoucherDraft {
    /// Derives taxes, total and invoice number at the given rates.
    ///
    /// Text fields are trimmed. The result carries everything except the id,
    /// status and timestamps, which the store assigns on insert.
    pub fn price(&self, taxes: &TaxSettings, airlines: &AirlineRegistry) -> NewVoucher {
        let receipt = self.receipt.trim().to_string();
        let restaurant = self.restaurant.trim().to_string();
        let airline = self.airline.trim().to_string();

        let breakdown = taxes.apply(self.subtotal);
        let invoice_number = generate_invoice_number(
            &self.date.format("%Y-%m-%d").to_string(),
            &restaurant,
            &airline,
            airlines,
        );

        NewVoucher {
            date: self.date,
            receipt,
            restaurant,
            airline,
            subtotal_cents: breakdown.subtotal.cents(),
            tps_cents: breakdown.tps.cents(),
            tvq_cents: breakdown.tvq.cents(),
            total_cents: breakdown.total.cents(),
            invoice_number,
        }
    }
}

/// A fully priced voucher ready for insertion. Status starts as Unbilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVoucher {
    pub date: NaiveDate,
    pub receipt: String,
    pub restaurant: String,
    pub airline: String,
    pub subtotal_cents: i64,
    pub tps_cents: i64,
    pub tvq_cents: i64,
    pub total_cents: i64,
    pub invoice_number: String,
}

// =============================================================================
// Registries
// =============================================================================

/// Ordered set of restaurant names. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantRegistry(Vec<String>);

impl RestaurantRegistry {
    pub fn new(names: Vec<String>) -> Self {
        RestaurantRegistry(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for RestaurantRegistry {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        RestaurantRegistry(iter.into_iter().collect())
    }
}

/// Airline name to 3-character code. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineRegistry(BTreeMap<String, String>);

impl AirlineRegistry {
    pub fn new() -> Self {
        AirlineRegistry(BTreeMap::new())
    }

    /// Registered code for an airline name, if any.
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates `(name, code)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AirlineRegistry {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        AirlineRegistry(iter.into_iter().collect())
    }
}

// =============================================================================
// Users
// =============================================================================

/// Access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including registries, tax settings and users.
    Admin,
    /// Day-to-day voucher work.
    User,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "user".to_string()],
            }),
        }
    }
}

/// A user account. The password is only ever held as an Argon2 PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
