//! # voucher-db: Database Layer for Voucher Desk
//!
//! SQLite persistence for vouchers, registries, tax settings and users,
//! built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Voucher Desk Data Flow                           │
//! │                                                                         │
//! │  voucher-cli command (invoice generate)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   voucher-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ VoucherRepo   │    │ 001_initial  │   │   │
//! │  │   │ SqlitePool    │◄───│ RegistryRepo  │    │  _schema.sql │   │   │
//! │  │   │ ensure_seeded │    │ TaxSettings   │    │              │   │   │
//! │  │   │               │    │ UserRepo      │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir or VOUCHER_DB_PATH)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`seed`] - Seed-on-empty initialization
//! - [`password`] - Argon2 hashing
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voucher_db::{Database, DbConfig, SeedDefaults};
//!
//! let db = Database::new(DbConfig::new("vouchers.db")).await?;
//! db.ensure_seeded(&SeedDefaults::default()).await?;
//!
//! let unbilled = db.vouchers().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use seed::{SeedDefaults, SeedReport};

pub use repository::registry::RegistryRepository;
pub use repository::tax::TaxSettingsRepository;
pub use repository::user::UserRepository;
pub use repository::voucher::VoucherRepository;
