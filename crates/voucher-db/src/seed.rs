//! # Seed-on-Empty Initialization
//!
//! Fills empty configuration tables once, at application start, after
//! migrations.
//!
//! ```text
//! Database::ensure_seeded(&SeedDefaults)
//!      │
//!      ├── restaurants empty?   → insert defaults
//!      ├── airlines empty?      → insert defaults
//!      ├── tax_settings empty?  → insert TPS 5% / TVQ 9.975%
//!      └── users empty?         → create admin (Argon2 hash)
//! ```
//! Each table is checked on its own, and a table that already has rows is
//! never touched. Calling it again is a no-op.

use serde::Serialize;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use voucher_core::{
    TaxSettings, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, INITIAL_AIRLINES,
    INITIAL_RESTAURANTS,
};

/// Values written into empty tables.
#[derive(Debug, Clone)]
pub struct SeedDefaults {
    pub restaurants: Vec<String>,
    /// `(name, code)` pairs.
    pub airlines: Vec<(String, String)>,
    pub tax: TaxSettings,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for SeedDefaults {
    fn default() -> Self {
        SeedDefaults {
            restaurants: INITIAL_RESTAURANTS.iter().map(|s| s.to_string()).collect(),
            airlines: INITIAL_AIRLINES
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
            tax: TaxSettings::default(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

/// Which tables were filled by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub restaurants: bool,
    pub airlines: bool,
    pub tax_settings: bool,
    pub admin: bool,
}

impl SeedReport {
    /// True if nothing needed seeding.
    pub fn is_noop(&self) -> bool {
        *self == SeedReport::default()
    }
}

impl Database {
    /// Seeds every empty configuration table. Idempotent.
    pub async fn ensure_seeded(&self, defaults: &SeedDefaults) -> DbResult<SeedReport> {
        let registries = self.registries();

        let report = SeedReport {
            restaurants: registries.ensure_restaurants(&defaults.restaurants).await?,
            airlines: registries.ensure_airlines(&defaults.airlines).await?,
            tax_settings: self.tax_settings().ensure(&defaults.tax).await?,
            admin: self
                .users()
                .ensure_admin(&defaults.admin_username, &defaults.admin_password)
                .await?,
        };

        if !report.is_noop() {
            info!(?report, "Configuration tables seeded");
        }
        Ok(report)
    }
}
