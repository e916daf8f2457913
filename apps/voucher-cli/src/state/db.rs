//! # Database State
//!
//! Wraps the `Database` connection for use in commands.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_vouchers(
//!     db: &DbState,
//!     session: &Session,
//!     filter: VoucherFilter,
//! ) -> Result<VoucherListResponse, ApiError> {
//!     let vouchers = db.inner().vouchers().list().await?;
//!     ...
//! }
//! ```

use tracing::info;

use super::config::AppConfig;
use voucher_core::TaxSettings;
use voucher_db::{Database, DbConfig, DbResult, SeedDefaults};

/// Wrapper around `Database` shared by every command.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Connects, applies migrations and seeds empty configuration tables.
    pub async fn open(config: &AppConfig) -> DbResult<Self> {
        let db_config = DbConfig::new(config.db_path()).max_connections(config.max_connections);
        let db = Database::new(db_config).await?;
        info!(db_path = %config.db_path().display(), "Database connected and migrations applied");

        db.ensure_seeded(&SeedDefaults::default()).await?;
        Ok(DbState { db })
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// Current tax rates, seeding the defaults if the row is missing.
    pub async fn tax_settings(&self) -> DbResult<TaxSettings> {
        self.db.tax_settings().load(&TaxSettings::default()).await
    }
}
