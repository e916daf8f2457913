//! # CSV Codec
//!
//! Encodes report rows as CSV text and decodes voucher files for import.
//!
//! ## Output Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every cell quoted, inner quotes doubled, one record per line:          │
//! │                                                                         │
//! │    "Date","Receipt #","Restaurant",...\n                                │
//! │    "2024-03-15","10042","Subway",...\n                                  │
//! │    ""\n                          ← blank separator row                  │
//! │                                                                         │
//! │  The last record ends with \n as well.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Import Rules
//! ```text
//! line 1            header, discarded
//! each next record  date, receipt, restaurant, airline, subtotal (trimmed)
//!   ├── field missing / empty        → skipped (MissingField)
//!   ├── (receipt, restaurant) known  → skipped (Duplicate)
//!   ├── date not YYYY-MM-DD          → skipped (InvalidDate)
//!   ├── subtotal < 0                 → skipped (NegativeSubtotal)
//!   └── otherwise priced at current rates, file order kept
//! ```
//! A subtotal that is not a number counts as zero.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AirlineRegistry, NewVoucher, TaxSettings, Voucher, VoucherDraft};

/// File name of the full voucher export.
pub const ALL_VOUCHERS_FILE_NAME: &str = "AllVouchers.csv";

/// Columns of the full export. The first five are the import columns.
pub const EXPORT_COLUMNS: [&str; 10] = [
    "Date",
    "Receipt #",
    "Restaurant",
    "Airline",
    "Subtotal",
    "TPS",
    "TVQ",
    "Total",
    "Invoice #",
    "Status",
];

const IMPORT_FIELDS: [&str; 5] = ["date", "receipt", "restaurant", "airline", "subtotal"];

// =============================================================================
// Export
// =============================================================================

/// Renders rows as always-quoted CSV text.
///
/// Rows may have different lengths. An empty row is written as a single
/// empty cell.
///
/// ```rust
/// use voucher_core::csv_io::to_csv;
///
/// let rows = vec![
///     vec!["Name".to_string(), "Note".to_string()],
///     vec![],
///     vec!["Subway".to_string(), "said \"hi\"".to_string()],
/// ];
/// assert_eq!(
///     to_csv(&rows).unwrap(),
///     "\"Name\",\"Note\"\n\"\"\n\"Subway\",\"said \"\"hi\"\"\"\n"
/// );
/// ```
pub fn to_csv(rows: &[Vec<String>]) -> CoreResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    for row in rows {
        let result = if row.is_empty() {
            writer.write_record([""])
        } else {
            writer.write_record(row)
        };
        result.map_err(|e| CoreError::Csv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Csv(e.to_string()))
}

/// Header plus one row per voucher, in the given order.
pub fn export_rows(vouchers: &[Voucher]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(vouchers.len() + 1);
    rows.push(EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect());
    rows.extend(vouchers.iter().map(|v| {
        vec![
            v.date_string(),
            v.receipt.clone(),
            v.restaurant.clone(),
            v.airline.clone(),
            v.subtotal().to_amount(),
            v.tps().to_amount(),
            v.tvq().to_amount(),
            v.total().to_amount(),
            v.invoice_number.clone(),
            v.status.to_string(),
        ]
    }));
    rows
}

/// Full export as CSV text.
pub fn export_vouchers(vouchers: &[Voucher]) -> CoreResult<String> {
    to_csv(&export_rows(vouchers))
}

// =============================================================================
// Import
// =============================================================================

/// Why an import row produced no voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MissingField(String),
    Duplicate,
    InvalidDate(String),
    NegativeSubtotal,
    SubtotalTooLarge,
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing {}", field),
            SkipReason::Duplicate => f.write_str("duplicate receipt for restaurant"),
            SkipReason::InvalidDate(value) => write!(f, "invalid date '{}'", value),
            SkipReason::NegativeSubtotal => f.write_str("negative subtotal"),
            SkipReason::SubtotalTooLarge => {
                write!(f, "subtotal above {}", Money::MAX_SUBTOTAL.to_amount())
            }
            SkipReason::Malformed(detail) => write!(f, "unreadable record: {}", detail),
        }
    }
}

/// A skipped row and its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: SkipReason,
}

/// Result of decoding an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// New vouchers in file order.
    pub vouchers: Vec<NewVoucher>,
    pub skipped: Vec<SkippedRow>,
}

/// Decodes a voucher file against the current collection.
///
/// `existing` is the active voucher collection used for duplicate detection.
/// Pairs seen earlier in the same file count as duplicates too. Taxes and
/// invoice numbers are derived from `taxes` and `airlines`.
pub fn import_vouchers(
    text: &str,
    existing: &[Voucher],
    airlines: &AirlineRegistry,
    taxes: &TaxSettings,
) -> ImportOutcome {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut seen: HashSet<(String, String)> = existing
        .iter()
        .map(|v| (v.receipt.clone(), v.restaurant.clone()))
        .collect();
    let mut outcome = ImportOutcome::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                outcome.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::Malformed(e.to_string()),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        match decode_record(&record, &mut seen) {
            Ok(draft) => outcome.vouchers.push(draft.price(taxes, airlines)),
            Err(reason) => outcome.skipped.push(SkippedRow { line, reason }),
        }
    }

    outcome
}

fn decode_record(
    record: &csv::StringRecord,
    seen: &mut HashSet<(String, String)>,
) -> Result<VoucherDraft, SkipReason> {
    let mut fields = [""; 5];
    for (i, name) in IMPORT_FIELDS.iter().enumerate() {
        match record.get(i) {
            Some(value) if !value.is_empty() => fields[i] = value,
            _ => return Err(SkipReason::MissingField(name.to_string())),
        }
    }
    let [date, receipt, restaurant, airline, subtotal] = fields;

    let key = (receipt.to_string(), restaurant.to_string());
    if seen.contains(&key) {
        return Err(SkipReason::Duplicate);
    }

    let date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| SkipReason::InvalidDate(date.to_string()))?;

    let subtotal = Money::parse_lenient(subtotal);
    if subtotal.is_negative() {
        return Err(SkipReason::NegativeSubtotal);
    }
    if subtotal > Money::MAX_SUBTOTAL {
        return Err(SkipReason::SubtotalTooLarge);
    }

    seen.insert(key);
    Ok(VoucherDraft {
        date,
        receipt: receipt.to_string(),
        restaurant: restaurant.to_string(),
        airline: airline.to_string(),
        subtotal,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoucherStatus;
    use chrono::{NaiveDate, Utc};

    fn airlines() -> AirlineRegistry {
        [("Air Canada".to_string(), "ACD".to_string())]
            .into_iter()
            .collect()
    }

    fn stored(receipt: &str, restaurant: &str, subtotal_cents: i64) -> Voucher {
        let taxes = TaxSettings::default().apply(Money::from_cents(subtotal_cents));
        Voucher {
            id: format!("id-{}", receipt),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            receipt: receipt.to_string(),
            restaurant: restaurant.to_string(),
            airline: "Air Canada".to_string(),
            subtotal_cents,
            tps_cents: taxes.tps.cents(),
            tvq_cents: taxes.tvq.cents(),
            total_cents: taxes.total.cents(),
            invoice_number: "SUBACD0324".to_string(),
            status: VoucherStatus::Unbilled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_csv_quotes_every_cell() {
        let rows = vec![vec!["a".to_string(), "b,c".to_string()]];
        assert_eq!(to_csv(&rows).unwrap(), "\"a\",\"b,c\"\n");
    }

    #[test]
    fn test_export_header_and_row() {
        let text = export_vouchers(&[stored("10042", "Subway", 10_000)]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"Date\",\"Receipt #\",\"Restaurant\",\"Airline\",\"Subtotal\",\"TPS\",\"TVQ\",\"Total\",\"Invoice #\",\"Status\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"2024-03-15\",\"10042\",\"Subway\",\"Air Canada\",\"100.00\",\"5.00\",\"9.98\",\"114.98\",\"SUBACD0324\",\"Unbilled\""
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_export_then_import_recovers_tuples() {
        let originals = vec![stored("1", "Subway", 1_250), stored("2", "Paramount", 900)];
        let text = export_vouchers(&originals).unwrap();

        let outcome = import_vouchers(&text, &[], &airlines(), &TaxSettings::default());
        assert!(outcome.skipped.is_empty());

        let recovered: Vec<_> = outcome
            .vouchers
            .iter()
            .map(|v| (v.date, v.receipt.as_str(), v.restaurant.as_str(), v.airline.as_str(), v.subtotal_cents))
            .collect();
        let expected: Vec<_> = originals
            .iter()
            .map(|v| (v.date, v.receipt.as_str(), v.restaurant.as_str(), v.airline.as_str(), v.subtotal_cents))
            .collect();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn test_import_skips_existing_pair() {
        let text = "Date,Receipt,Restaurant,Airline,Subtotal\n2024-03-15,10042,Subway,Air Canada,12.50\n";
        let existing = vec![stored("10042", "Subway", 1_250)];

        let outcome = import_vouchers(text, &existing, &airlines(), &TaxSettings::default());
        assert!(outcome.vouchers.is_empty());
        assert_eq!(
            outcome.skipped,
            vec![SkippedRow { line: 2, reason: SkipReason::Duplicate }]
        );
    }

    #[test]
    fn test_import_same_receipt_other_restaurant_is_new() {
        let text = "h\n2024-03-15,10042,Paramount,Air Canada,12.50\n";
        let existing = vec![stored("10042", "Subway", 1_250)];

        let outcome = import_vouchers(text, &existing, &airlines(), &TaxSettings::default());
        assert_eq!(outcome.vouchers.len(), 1);
    }

    #[test]
    fn test_import_skips_duplicates_within_file() {
        let text = "h\n2024-03-15,7,Subway,Air Canada,1\n2024-03-16,7,Subway,Air Canada,2\n";
        let outcome = import_vouchers(text, &[], &airlines(), &TaxSettings::default());
        assert_eq!(outcome.vouchers.len(), 1);
        assert_eq!(outcome.skipped[0].line, 3);
    }

    #[test]
    fn test_import_row_rules() {
        let text = "\
Date,Receipt,Restaurant,Airline,Subtotal
2024-03-15,1,Subway,Air Canada,
2024-03-15,2,Subway
2024-13-01,3,Subway,Air Canada,5
2024-03-15,4,Subway,Air Canada,-5
2024-03-15,5,Subway,Air Canada,abc
 2024-03-15 , 6 , Subway , WestJet , 10
";
        let outcome = import_vouchers(text, &[], &airlines(), &TaxSettings::default());

        let reasons: Vec<_> = outcome.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::MissingField("subtotal".to_string()),
                SkipReason::MissingField("airline".to_string()),
                SkipReason::InvalidDate("2024-13-01".to_string()),
                SkipReason::NegativeSubtotal,
            ]
        );

        assert_eq!(outcome.vouchers.len(), 2);
        // Non-numeric subtotal counts as zero
        assert_eq!(outcome.vouchers[0].receipt, "5");
        assert_eq!(outcome.vouchers[0].total_cents, 0);
        // Trimmed fields, unknown airline falls back to its prefix
        assert_eq!(outcome.vouchers[1].receipt, "6");
        assert_eq!(outcome.vouchers[1].invoice_number, "SUBWES0324");
        assert_eq!(outcome.vouchers[1].total_cents, 1_150);
    }

    #[test]
    fn test_import_skips_oversized_subtotal() {
        let text = "\
Date,Receipt,Restaurant,Airline,Subtotal
2024-03-15,1,Subway,Air Canada,90000000000000000
2024-03-15,2,Subway,Air Canada,10000000.00
";
        let outcome = import_vouchers(text, &[], &airlines(), &TaxSettings::default());
        assert_eq!(
            outcome.skipped,
            vec![SkippedRow { line: 2, reason: SkipReason::SubtotalTooLarge }]
        );
        assert_eq!(outcome.vouchers.len(), 1);
        assert_eq!(outcome.vouchers[0].subtotal_cents, Money::MAX_SUBTOTAL.cents());
        assert!(outcome.vouchers[0].total_cents > 0);
    }

    #[test]
    fn test_import_handles_quoted_commas() {
        let text = "h\n\"2024-03-15\",\"10,042\",\"Subway\",\"Air Canada\",\"100\"\n";
        let outcome = import_vouchers(text, &[], &airlines(), &TaxSettings::default());
        assert_eq!(outcome.vouchers.len(), 1);
        assert_eq!(outcome.vouchers[0].receipt, "10,042");
        assert_eq!(outcome.vouchers[0].total_cents, 11_498);
    }
}
