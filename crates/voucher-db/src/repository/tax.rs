//! Tax settings: a singleton row (`id = 1`) holding both rates in
//! thousandths of a percent.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use voucher_core::{TaxRate, TaxSettings};

/// Repository for the global TPS/TVQ rates.
#[derive(Debug, Clone)]
pub struct TaxSettingsRepository {
    pool: SqlitePool,
}

impl TaxSettingsRepository {
    /// Creates a new TaxSettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaxSettingsRepository { pool }
    }

    /// Returns the stored rates, if the row exists.
    pub async fn get(&self) -> DbResult<Option<TaxSettings>> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT tps_milli_percent, tvq_milli_percent FROM tax_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(tps, tvq)| TaxSettings {
            tps: TaxRate::from_milli_percent(tps as u32),
            tvq: TaxRate::from_milli_percent(tvq as u32),
        }))
    }

    /// Returns the stored rates, or `defaults` (stored first) if none exist.
    pub async fn load(&self, defaults: &TaxSettings) -> DbResult<TaxSettings> {
        match self.get().await? {
            Some(settings) => Ok(settings),
            None => {
                self.ensure(defaults).await?;
                Ok(*defaults)
            }
        }
    }

    /// Creates or overwrites the singleton row.
    ///
    /// Existing vouchers keep the taxes computed at their creation.
    pub async fn save(&self, settings: &TaxSettings) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tax_settings (id, tps_milli_percent, tvq_milli_percent, updated_at)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET
                tps_milli_percent = excluded.tps_milli_percent,
                tvq_milli_percent = excluded.tvq_milli_percent,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(settings.tps.milli_percent() as i64)
        .bind(settings.tvq.milli_percent() as i64)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(tps = %settings.tps, tvq = %settings.tvq, "Tax settings saved");
        Ok(())
    }

    /// Stores `defaults` only if no row exists. Returns true if it seeded.
    pub async fn ensure(&self, defaults: &TaxSettings) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO tax_settings (id, tps_milli_percent, tvq_milli_percent, updated_at)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(defaults.tps.milli_percent() as i64)
        .bind(defaults.tvq.milli_percent() as i64)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let seeded = result.rows_affected() > 0;
        if seeded {
            info!(tps = %defaults.tps, tvq = %defaults.tvq, "Seeded tax settings");
        }
        Ok(seeded)
    }
}
