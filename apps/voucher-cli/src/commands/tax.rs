//! # Tax Settings Commands
//!
//! New rates apply to vouchers entered afterwards and to invoice totals.
//! Stored vouchers keep the taxes computed when they were entered.

use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::error::ApiError;
use crate::state::DbState;
use voucher_core::{Capability, Session, TaxRate, TaxSettings};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSettingsResponse {
    pub tps_percent: f64,
    pub tvq_percent: f64,
}

impl From<TaxSettings> for TaxSettingsResponse {
    fn from(settings: TaxSettings) -> Self {
        TaxSettingsResponse {
            tps_percent: settings.tps.percentage(),
            tvq_percent: settings.tvq.percentage(),
        }
    }
}

pub async fn show_taxes(db: &DbState, session: &Session) -> Result<TaxSettingsResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;
    Ok(db.tax_settings().await?.into())
}

/// Replaces both rates. Each must be within 0..=100 percent.
pub async fn set_taxes(
    db: &DbState,
    session: &Session,
    tps_percent: f64,
    tvq_percent: f64,
) -> Result<TaxSettingsResponse, ApiError> {
    session.require(Capability::ManageTaxSettings)?;

    let settings = TaxSettings {
        tps: TaxRate::try_from_percentage("tps", tps_percent)?,
        tvq: TaxRate::try_from_percentage("tvq", tvq_percent)?,
    };
    db.inner().tax_settings().save(&settings).await?;
    info!(by = %session.username, "Tax settings updated");

    Ok(settings.into())
}

impl fmt::Display for TaxSettingsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TPS {}%\nTVQ {}%", self.tps_percent, self.tvq_percent)
    }
}
