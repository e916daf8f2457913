//! # Database Migrations
//!
//! Embedded SQL migrations for Voucher Desk.
//!
//! ## How Migrations Work
//! ```text
//! Database::new
//!      │
//!      ▼
//! _sqlx_migrations table (created if missing)
//!      │
//!      ├── 001_initial_schema.sql  ✓ applied
//!      └── 002_...                 ⬜ pending → run in order, record checksum
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create `migrations/sqlite/NNN_description.sql` with the next number
//! 2. **NEVER** modify an applied migration - always add a new one

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migrations embedded from `migrations/sqlite` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}
