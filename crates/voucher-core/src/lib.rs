//! # voucher-core: Pure Business Logic for Voucher Desk
//!
//! Restaurants feed stranded airline passengers and later bill the airline
//! for the meal vouchers they accepted. This crate holds every rule that
//! turns a receipt into a billable voucher, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Voucher Desk Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 voucher-cli (commands, sessions)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ voucher-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │ invoice │ │  aging  │ │ csv_io  │ │  auth   │  │   │
//! │  │   │ TaxRate │ │ number  │ │ buckets │ │ export  │ │ roles   │  │   │
//! │  │   │ taxes   │ │ batch   │ │         │ │ import  │ │ session │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  voucher-db (SQLite store)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Voucher, registries, TaxRate, User)
//! - [`money`] - Integer-cent money and the two-tax calculator
//! - [`invoice`] - Invoice numbers and invoice batch documents
//! - [`aging`] - Aging buckets over unbilled vouchers
//! - [`csv_io`] - CSV export and voucher import
//! - [`filter`] - Voucher list filtering
//! - [`auth`] - Roles, capabilities and sessions
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use voucher_core::money::{calculate_taxes, Money};
//! use voucher_core::types::TaxRate;
//!
//! let taxes = calculate_taxes(
//!     Money::from_cents(10_000),
//!     TaxRate::from_percentage(5.0),
//!     TaxRate::from_percentage(9.975),
//! );
//! assert_eq!(taxes.tps.cents(), 500);
//! assert_eq!(taxes.tvq.cents(), 998);
//! assert_eq!(taxes.total.cents(), 11_498);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aging;
pub mod auth;
pub mod csv_io;
pub mod error;
pub mod filter;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aging::{calculate_aging_buckets, AgingBucket, AgingBuckets};
pub use auth::{Capability, Session};
pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::VoucherFilter;
pub use invoice::{generate_invoice_number, InvoiceBatch};
pub use money::{calculate_taxes, Money, TaxBreakdown};
pub use types::*;

// =============================================================================
// Seed Values
// =============================================================================

/// Restaurants registered when the registry is empty on first start.
pub const INITIAL_RESTAURANTS: [&str; 4] = ["Subway", "Paramount", "Pretzels", "LFD Bagel"];

/// Airlines (name, code) registered when the registry is empty on first start.
pub const INITIAL_AIRLINES: [(&str, &str); 3] = [
    ("Air Canada", "ACD"),
    ("Air France", "AFR"),
    ("British Airways", "BAW"),
];

/// Default TPS (federal GST) rate in percent.
pub const DEFAULT_TPS_PERCENT: f64 = 5.0;

/// Default TVQ (Quebec sales tax) rate in percent.
pub const DEFAULT_TVQ_PERCENT: f64 = 9.975;

/// Username of the administrator created on an empty user table.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Initial password of the seeded administrator. Change it after first login.
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin123";

/// Maximum length of a receipt number.
pub const MAX_RECEIPT_LENGTH: usize = 64;

/// Maximum length of a restaurant or airline name.
pub const MAX_NAME_LENGTH: usize = 100;
