//! # Report Commands
//!
//! Aging of unbilled vouchers, optionally exported to `AgingReport.csv`.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

use crate::error::ApiError;
use crate::state::{AppConfig, DbState};
use voucher_core::aging::AGING_REPORT_FILE_NAME;
use voucher_core::csv_io::to_csv;
use voucher_core::{calculate_aging_buckets, Capability, Money, Session};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingBucketLine {
    pub label: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingReportResponse {
    pub as_of: NaiveDate,
    pub buckets: Vec<AgingBucketLine>,
    pub total_unbilled_cents: i64,
    /// Set when the report was exported.
    pub path: Option<PathBuf>,
}

/// Buckets unbilled totals by age as of `as_of` (default: today, local time).
pub async fn aging_report(
    db: &DbState,
    config: &AppConfig,
    session: &Session,
    as_of: Option<NaiveDate>,
    export: bool,
) -> Result<AgingReportResponse, ApiError> {
    session.require(Capability::ViewReports)?;

    let today = as_of.unwrap_or_else(|| Local::now().date_naive());
    let vouchers = db.inner().vouchers().list().await?;
    let buckets = calculate_aging_buckets(&vouchers, today);

    let path = if export {
        let path = config.export_path(AGING_REPORT_FILE_NAME);
        tokio::fs::write(&path, to_csv(&buckets.to_rows())?).await?;
        info!(path = %path.display(), as_of = %today, "Aging report exported");
        Some(path)
    } else {
        None
    };

    Ok(AgingReportResponse {
        as_of: today,
        buckets: buckets
            .iter()
            .map(|(label, amount)| AgingBucketLine {
                label: label.to_string(),
                amount_cents: amount.cents(),
            })
            .collect(),
        total_unbilled_cents: buckets.total().cents(),
        path,
    })
}

impl fmt::Display for AgingReportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Aging of unbilled vouchers as of {}", self.as_of)?;
        for line in &self.buckets {
            writeln!(f, "  {:<16} {:>12}", line.label, Money::from_cents(line.amount_cents).to_string())?;
        }
        write!(
            f,
            "  {:<16} {:>12}",
            "Total Unbilled",
            Money::from_cents(self.total_unbilled_cents).to_string()
        )?;
        if let Some(path) = &self.path {
            write!(f, "\nWritten to {}", path.display())?;
        }
        Ok(())
    }
}
