//! # Repository Module
//!
//! Database repository implementations for Voucher Desk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command                                                            │
//! │       │                                                                 │
//! │       │  db.vouchers().mark_invoiced(&ids)                              │
//! │       ▼                                                                 │
//! │  VoucherRepository / RegistryRepository /                               │
//! │  TaxSettingsRepository / UserRepository                                 │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked, bound parameters)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`VoucherRepository`](voucher::VoucherRepository) - Active and archived vouchers
//! - [`RegistryRepository`](registry::RegistryRepository) - Restaurants and airlines
//! - [`TaxSettingsRepository`](tax::TaxSettingsRepository) - TPS/TVQ singleton
//! - [`UserRepository`](user::UserRepository) - Accounts and credentials

pub mod registry;
pub mod tax;
pub mod user;
pub mod voucher;
