//! # Database Handle
//!
//! Opens the SQLite store behind every command.
//!
//! ```text
//! DbConfig::new(path)          DbConfig::in_memory()
//!        │                            │ (tests, one connection)
//!        └────────────┬───────────────┘
//!                     ▼
//!            Database::new(config)  ── pool + pending migrations
//!                     │
//!                     ▼
//!   vouchers() · registries() · tax_settings() · users()
//! ```
//!
//! File databases run in WAL mode so a report can read while an import writes.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::registry::RegistryRepository;
use crate::repository::tax::TaxSettingsRepository;
use crate::repository::user::UserRepository;
use crate::repository::voucher::VoucherRepository;

const IN_MEMORY: &str = ":memory:";

/// Where the store lives and how many connections it may hold.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
}

impl DbConfig {
    /// A file-backed store, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private in-memory store. Every connection to `:memory:` sees its own
    /// empty database, so the pool is pinned to one.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };
        Ok(options.foreign_keys(true))
    }
}

/// Pool handle handing out repositories. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening voucher store");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        migrations::run_migrations(&pool).await?;
        Ok(Database { pool })
    }

    pub fn vouchers(&self) -> VoucherRepository {
        VoucherRepository::new(self.pool.clone())
    }

    pub fn registries(&self) -> RegistryRepository {
        RegistryRepository::new(self.pool.clone())
    }

    pub fn tax_settings(&self) -> TaxSettingsRepository {
        TaxSettingsRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Waits for open connections to finish and closes the pool.
    pub async fn close(&self) {
        debug!("Closing voucher store");
        self.pool.close().await;
    }
}
