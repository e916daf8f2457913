//! # Voucher Commands
//!
//! Entry, listing, archival, payment and CSV import/export of vouchers.
//!
//! ```text
//! voucher add ──► validate_draft ──► VoucherDraft::price ──► vouchers.insert
//! voucher import <file> ──► import_vouchers (skip report) ──► insert_many
//! voucher export ──► export_vouchers ──► <export dir>/AllVouchers.csv
//! ```

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ApiError, ErrorCode};
use crate::state::{AppConfig, DbState};
use voucher_core::csv_io::{self, SkippedRow, ALL_VOUCHERS_FILE_NAME};
use voucher_core::validation::{parse_date, parse_subtotal, validate_draft, validate_uuid};
use voucher_core::{
    ArchivedVoucher, Capability, CoreError, Money, Session, Voucher, VoucherDraft, VoucherFilter,
};

// =============================================================================
// Request / Response Types
// =============================================================================

/// Raw form input for `voucher add`.
#[derive(Debug, Clone)]
pub struct AddVoucherInput {
    pub date: String,
    pub receipt: String,
    pub restaurant: String,
    pub airline: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherResponse {
    pub voucher: Voucher,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherListResponse {
    pub vouchers: Vec<Voucher>,
    pub count: usize,
    pub subtotal_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedListResponse {
    pub vouchers: Vec<ArchivedVoucher>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveResponse {
    pub archived: ArchivedVoucher,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub path: PathBuf,
    pub voucher_count: usize,
}

// =============================================================================
// Commands
// =============================================================================

/// Adds one voucher from operator input.
///
/// Both parties must be registered and the subtotal must be a non-negative
/// decimal. Taxes use the current rates.
pub async fn add_voucher(
    db: &DbState,
    session: &Session,
    input: AddVoucherInput,
) -> Result<VoucherResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;
    debug!(receipt = %input.receipt, restaurant = %input.restaurant, "add_voucher command");

    let draft = VoucherDraft {
        date: parse_date("date", &input.date)?,
        receipt: input.receipt,
        restaurant: input.restaurant,
        airline: input.airline,
        subtotal: parse_subtotal(&input.subtotal)?,
    };

    let registries = db.inner().registries();
    let restaurants = registries.restaurants().await?;
    let airlines = registries.airlines().await?;
    validate_draft(&draft, &restaurants, &airlines)?;

    let taxes = db.tax_settings().await?;
    let voucher = db
        .inner()
        .vouchers()
        .insert(&draft.price(&taxes, &airlines))
        .await?;

    info!(
        id = %voucher.id,
        invoice_number = %voucher.invoice_number,
        total = %voucher.total(),
        "Voucher added"
    );
    Ok(VoucherResponse { voucher })
}

/// Lists active vouchers matching `filter`, newest receipt first.
pub async fn list_vouchers(
    db: &DbState,
    session: &Session,
    filter: VoucherFilter,
) -> Result<VoucherListResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;

    let all = db.inner().vouchers().list().await?;
    let vouchers: Vec<Voucher> = filter.apply(&all).into_iter().cloned().collect();

    let subtotal: Money = vouchers.iter().map(Voucher::subtotal).sum();
    let total: Money = vouchers.iter().map(Voucher::total).sum();

    Ok(VoucherListResponse {
        count: vouchers.len(),
        subtotal_cents: subtotal.cents(),
        total_cents: total.cents(),
        vouchers,
    })
}

/// Moves a voucher out of the active collection.
pub async fn archive_voucher(
    db: &DbState,
    session: &Session,
    id: &str,
) -> Result<ArchiveResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;
    validate_uuid("id", id)?;

    let archived = db.inner().vouchers().archive(id).await?;
    Ok(ArchiveResponse { archived })
}

/// Lists archived vouchers.
pub async fn list_archived(
    db: &DbState,
    session: &Session,
) -> Result<ArchivedListResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;

    let vouchers = db.inner().vouchers().list_archived().await?;
    Ok(ArchivedListResponse { vouchers })
}

/// Records payment of an invoiced voucher.
pub async fn mark_paid(
    db: &DbState,
    session: &Session,
    id: &str,
) -> Result<VoucherResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;
    validate_uuid("id", id)?;

    let vouchers = db.inner().vouchers();
    if !vouchers.mark_paid(id).await? {
        let current = vouchers
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Voucher", id))?;
        return Err(CoreError::InvalidVoucherStatus {
            voucher_id: id.to_string(),
            current_status: current.status.to_string(),
        }
        .into());
    }

    let voucher = vouchers
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Voucher", id))?;
    info!(id = %voucher.id, "Voucher marked paid");
    Ok(VoucherResponse { voucher })
}

/// Imports vouchers from a CSV file (`Date, Receipt #, Restaurant, Airline,
/// Subtotal`, header row first).
///
/// Rows that cannot become a voucher are reported, not fatal. The accepted
/// rows are inserted in one transaction.
pub async fn import_vouchers(
    db: &DbState,
    session: &Session,
    path: &Path,
) -> Result<ImportResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;

    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        ApiError::new(
            ErrorCode::IoError,
            format!("Could not read {}: {}", path.display(), e),
        )
    })?;

    let existing = db.inner().vouchers().list().await?;
    let airlines = db.inner().registries().airlines().await?;
    let taxes = db.tax_settings().await?;

    let outcome = csv_io::import_vouchers(&text, &existing, &airlines, &taxes);
    let inserted = if outcome.vouchers.is_empty() {
        Vec::new()
    } else {
        db.inner().vouchers().insert_many(&outcome.vouchers).await?
    };

    info!(
        file = %path.display(),
        imported = inserted.len(),
        skipped = outcome.skipped.len(),
        "Import finished"
    );
    Ok(ImportResponse {
        imported: inserted.len(),
        skipped: outcome.skipped,
    })
}

/// Writes every active voucher to `<export dir>/AllVouchers.csv`.
pub async fn export_vouchers(
    db: &DbState,
    config: &AppConfig,
    session: &Session,
) -> Result<ExportResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;

    let vouchers = db.inner().vouchers().list().await?;
    let text = csv_io::export_vouchers(&vouchers)?;

    let path = config.export_path(ALL_VOUCHERS_FILE_NAME);
    tokio::fs::write(&path, text).await?;

    info!(path = %path.display(), count = vouchers.len(), "Vouchers exported");
    Ok(ExportResponse {
        path,
        voucher_count: vouchers.len(),
    })
}

// =============================================================================
// Terminal Output
// =============================================================================

/// One table line per voucher.
pub(crate) fn voucher_line(v: &Voucher) -> String {
    format!(
        "{}  {}  {:<14} {:<12} {:<16} {:>10} {:>8} {:>8} {:>10}  {:<11} {}",
        v.id,
        v.date_string(),
        v.receipt,
        v.restaurant,
        v.airline,
        v.subtotal().to_string(),
        v.tps().to_string(),
        v.tvq().to_string(),
        v.total().to_string(),
        v.invoice_number,
        v.status
    )
}

impl fmt::Display for VoucherResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", voucher_line(&self.voucher))
    }
}

impl fmt::Display for VoucherListResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in &self.vouchers {
            writeln!(f, "{}", voucher_line(v))?;
        }
        write!(
            f,
            "{} voucher(s), subtotal {}, total {}",
            self.count,
            Money::from_cents(self.subtotal_cents),
            Money::from_cents(self.total_cents)
        )
    }
}

impl fmt::Display for ArchivedListResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.vouchers {
            writeln!(
                f,
                "{}  (archived {})",
                voucher_line(&a.voucher),
                a.archived_at.format("%Y-%m-%d %H:%M")
            )?;
        }
        write!(f, "{} archived voucher(s)", self.vouchers.len())
    }
}

impl fmt::Display for ArchiveResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Archived {} ({} @ {})",
            self.archived.voucher.id, self.archived.voucher.receipt, self.archived.voucher.restaurant
        )
    }
}

impl fmt::Display for ImportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.skipped {
            writeln!(f, "line {}: skipped, {}", row.line, row.reason)?;
        }
        write!(
            f,
            "Imported {} voucher(s), skipped {}",
            self.imported,
            self.skipped.len()
        )
    }
}

impl fmt::Display for ExportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} voucher(s) to {}",
            self.voucher_count,
            self.path.display()
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{add, input, TestApp};
    use voucher_core::csv_io::SkipReason;
    use voucher_core::VoucherStatus;

    #[tokio::test]
    async fn test_add_voucher_prices_at_current_rates() {
        let app = TestApp::new().await;
        let resp = add_voucher(&app.db, &app.clerk, input("2024-03-15", "R-1", "Subway", "Air Canada", "100.00"))
            .await
            .unwrap();

        let v = resp.voucher;
        assert_eq!(v.subtotal_cents, 10_000);
        assert_eq!(v.tps_cents, 500);
        assert_eq!(v.tvq_cents, 998);
        assert_eq!(v.total_cents, 11_498);
        assert_eq!(v.invoice_number, "SUBACD0324");
        assert_eq!(v.status, VoucherStatus::Unbilled);
    }

    #[tokio::test]
    async fn test_add_voucher_rejects_duplicate_receipt() {
        let app = TestApp::new().await;
        add(&app, "2024-03-15", "R-1", "Subway", "Air Canada", "10").await;

        let err = add_voucher(&app.db, &app.clerk, input("2024-03-16", "R-1", "Subway", "Air France", "12"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);

        // Same receipt at another restaurant is a different voucher
        add(&app, "2024-03-16", "R-1", "Paramount", "Air France", "12").await;
    }

    #[tokio::test]
    async fn test_add_voucher_validates_input() {
        let app = TestApp::new().await;

        let err = add_voucher(&app.db, &app.clerk, input("2024-02-30", "R-1", "Subway", "Air Canada", "10"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_voucher(&app.db, &app.clerk, input("2024-03-01", "R-1", "Subway", "Air Canada", "ten"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_voucher(&app.db, &app.clerk, input("2024-03-01", "R-1", "Tim Hortons", "Air Canada", "10"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_voucher(&app.db, &app.clerk, input("2024-03-01", "  ", "Subway", "Air Canada", "10"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_voucher(&app.db, &app.clerk, input("2024-03-01", "R-1", "Subway", "Air Canada", "90000000000000000"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("subtotal"));

        assert_eq!(app.db.inner().vouchers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_vouchers_filters_and_sums() {
        let app = TestApp::new().await;
        add(&app, "2024-03-01", "R-1", "Subway", "Air Canada", "10.00").await;
        add(&app, "2024-03-05", "R-2", "Subway", "Air France", "20.00").await;
        add(&app, "2024-03-09", "R-3", "Paramount", "Air Canada", "30.00").await;

        let all = list_vouchers(&app.db, &app.clerk, VoucherFilter::default()).await.unwrap();
        assert_eq!(all.count, 3);
        assert_eq!(all.vouchers[0].receipt, "R-3");
        assert_eq!(all.subtotal_cents, 6_000);

        let filter = VoucherFilter {
            airline: Some("canada".into()),
            ..Default::default()
        };
        let canada = list_vouchers(&app.db, &app.clerk, filter).await.unwrap();
        assert_eq!(canada.count, 2);
        assert!(canada.vouchers.iter().all(|v| v.airline == "Air Canada"));
    }

    #[tokio::test]
    async fn test_archive_removes_from_active_list() {
        let app = TestApp::new().await;
        let v = add(&app, "2024-03-01", "R-1", "Subway", "Air Canada", "10.00").await;

        let resp = archive_voucher(&app.db, &app.clerk, &v.id).await.unwrap();
        assert_eq!(resp.archived.voucher.id, v.id);

        let active = list_vouchers(&app.db, &app.clerk, VoucherFilter::default()).await.unwrap();
        assert_eq!(active.count, 0);

        let archived = list_archived(&app.db, &app.clerk).await.unwrap();
        assert_eq!(archived.vouchers.len(), 1);

        let err = archive_voucher(&app.db, &app.clerk, &v.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_mark_paid_requires_invoiced() {
        let app = TestApp::new().await;
        let v = add(&app, "2024-03-01", "R-1", "Subway", "Air Canada", "10.00").await;

        let err = mark_paid(&app.db, &app.clerk, &v.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        app.db.inner().vouchers().mark_invoiced(&[v.id.clone()]).await.unwrap();
        let paid = mark_paid(&app.db, &app.clerk, &v.id).await.unwrap();
        assert_eq!(paid.voucher.status, VoucherStatus::Paid);
    }

    #[tokio::test]
    async fn test_import_reports_skipped_rows() {
        let app = TestApp::new().await;
        add(&app, "2024-03-01", "R-1", "Subway", "Air Canada", "10.00").await;

        let path = app.export_dir.path().join("in.csv");
        tokio::fs::write(
            &path,
            "Date,Receipt #,Restaurant,Airline,Subtotal\n\
             2024-03-02,R-1,Subway,Air Canada,5.00\n\
             2024-03-03,R-2,Subway,Air Canada,abc\n\
             2024-13-01,R-3,Subway,Air Canada,5.00\n\
             2024-03-04,R-4,Paramount,Air France,100.00\n",
        )
        .await
        .unwrap();

        let resp = import_vouchers(&app.db, &app.clerk, &path).await.unwrap();
        assert_eq!(resp.imported, 2);
        assert_eq!(resp.skipped.len(), 2);
        assert_eq!(resp.skipped[0].reason, SkipReason::Duplicate);
        assert!(matches!(resp.skipped[1].reason, SkipReason::InvalidDate(_)));

        let all = list_vouchers(&app.db, &app.clerk, VoucherFilter::default()).await.unwrap();
        let r2 = all.vouchers.iter().find(|v| v.receipt == "R-2").unwrap();
        assert_eq!(r2.total_cents, 0);
        let r4 = all.vouchers.iter().find(|v| v.receipt == "R-4").unwrap();
        assert_eq!(r4.total_cents, 11_498);
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let app = TestApp::new().await;
        let path = app.export_dir.path().join("missing.csv");
        let err = import_vouchers(&app.db, &app.clerk, &path).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::IoError);
    }

    #[tokio::test]
    async fn test_export_writes_all_vouchers_file() {
        let app = TestApp::new().await;
        add(&app, "2024-03-15", "R-1", "Subway", "Air Canada", "100.00").await;

        let resp = export_vouchers(&app.db, &app.config, &app.clerk).await.unwrap();
        assert_eq!(resp.voucher_count, 1);
        assert!(resp.path.ends_with("AllVouchers.csv"));

        let text = tokio::fs::read_to_string(&resp.path).await.unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            r#""Date","Receipt #","Restaurant","Airline","Subtotal","TPS","TVQ","Total","Invoice #","Status""#
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""2024-03-15","R-1","Subway","Air Canada","100.00","5.00","9.98","114.98","SUBACD0324","Unbilled""#
        );
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_exported_file_reimports_as_duplicates() {
        let app = TestApp::new().await;
        add(&app, "2024-03-15", "R-1", "Subway", "Air Canada", "100.00").await;
        let export = export_vouchers(&app.db, &app.config, &app.clerk).await.unwrap();

        let resp = import_vouchers(&app.db, &app.clerk, &export.path).await.unwrap();
        assert_eq!(resp.imported, 0);
        assert_eq!(resp.skipped.len(), 1);
        assert_eq!(resp.skipped[0].reason, SkipReason::Duplicate);
    }
}
