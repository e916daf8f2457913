//! # Invoice Commands
//!
//! ## Generation Flow
//! ```text
//! invoice generate <id>...
//!      │
//!      ├── no ids?                    → VALIDATION_ERROR, nothing read or written
//!      ├── vouchers.get_many(ids)     → NOT_FOUND on an unknown id
//!      ├── InvoiceBatch::build        → mixed parties / already billed rejected
//!      │
//!      ├── create <export dir>/Invoice_{number}.csv
//!      │     (taken? Invoice_{number}_2.csv, _3, ...)
//!      │
//!      └── vouchers.mark_invoiced(ids)   (one transaction)
//! ```
//! The document is written before any status changes. A failed write leaves
//! every voucher Unbilled. An existing document is never overwritten.

use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{ApiError, ErrorCode};
use crate::state::{AppConfig, DbState};
use voucher_core::{Capability, CoreError, InvoiceBatch, Money, Session};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub invoice_number: String,
    pub restaurant: String,
    pub airline: String,
    pub path: PathBuf,
    pub voucher_count: usize,
    pub subtotal_cents: i64,
    pub tps_cents: i64,
    pub tvq_cents: i64,
    pub total_cents: i64,
}

/// Bills the selected vouchers as one invoice document.
pub async fn generate_invoice(
    db: &DbState,
    config: &AppConfig,
    session: &Session,
    ids: &[String],
) -> Result<InvoiceResponse, ApiError> {
    session.require(Capability::GenerateInvoices)?;
    debug!(count = ids.len(), "generate_invoice command");

    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Err(CoreError::EmptySelection.into());
    }

    let vouchers = db.inner().vouchers().get_many(&ids).await?;
    let taxes = db.tax_settings().await?;
    let batch = InvoiceBatch::build(&vouchers, &taxes)?;

    let path = write_new_document(config, &batch, batch.to_csv()?.as_bytes()).await?;

    if let Err(e) = db.inner().vouchers().mark_invoiced(&batch.voucher_ids()).await {
        // Vouchers stay Unbilled, so the document must go too
        let _ = tokio::fs::remove_file(&path).await;
        return Err(e.into());
    }

    info!(
        invoice_number = %batch.invoice_number,
        vouchers = batch.vouchers.len(),
        total = %batch.totals.total,
        path = %path.display(),
        "Invoice generated"
    );

    Ok(InvoiceResponse {
        invoice_number: batch.invoice_number,
        restaurant: batch.restaurant,
        airline: batch.airline,
        path,
        voucher_count: batch.vouchers.len(),
        subtotal_cents: batch.totals.subtotal.cents(),
        tps_cents: batch.totals.tps.cents(),
        tvq_cents: batch.totals.tvq.cents(),
        total_cents: batch.totals.total.cents(),
    })
}

/// Highest `_n` suffix tried before giving up on a free file name.
const MAX_DOCUMENTS_PER_NUMBER: u32 = 999;

/// Writes the document under the first free file name for its invoice number.
async fn write_new_document(
    config: &AppConfig,
    batch: &InvoiceBatch,
    contents: &[u8],
) -> Result<PathBuf, ApiError> {
    for sequence in 1..=MAX_DOCUMENTS_PER_NUMBER {
        let path = config.export_path(&batch.file_name(sequence));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Invoice file exists, trying next name");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(contents).await?;
        file.flush().await?;
        return Ok(path);
    }

    Err(ApiError::new(
        ErrorCode::Duplicate,
        format!("Too many invoice documents for {}", batch.invoice_number),
    ))
}

/// Trims ids and drops blanks and repeats, keeping first occurrences.
fn unique_ids(ids: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        if !unique.iter().any(|u| u == id) {
            unique.push(id.to_string());
        }
    }
    unique
}

impl fmt::Display for InvoiceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Invoice {} ({} / {}): {} voucher(s)",
            self.invoice_number, self.restaurant, self.airline, self.voucher_count
        )?;
        writeln!(
            f,
            "Subtotal {}  TPS {}  TVQ {}  Total {}",
            Money::from_cents(self.subtotal_cents),
            Money::from_cents(self.tps_cents),
            Money::from_cents(self.tvq_cents),
            Money::from_cents(self.total_cents)
        )?;
        write!(f, "Written to {}", self.path.display())
    }
}
