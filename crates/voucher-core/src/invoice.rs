//! # Invoice Module
//!
//! Invoice numbers and invoice batch documents.
//!
//! ## Invoice Number Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   date 2024-03-15   restaurant "Subway"   airline "Air Canada" → ACD    │
//! │                                                                         │
//! │          S U B        A C D        0 3        2 4                        │
//! │          ─────        ─────        ───        ───                        │
//! │        restaurant    airline      month      year                        │
//! │        (3 chars)     (code)       (MM)       (YY)                        │
//! │                                                                         │
//! │                      → "SUBACD0324"                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invoice Batch Document
//! ```text
//! "Invoice #","SUBACD0324"
//! "Restaurant","Subway"
//! "Airline","Air Canada"
//! ""
//! "POS Receipt Date","Receipt #","Subtotal","TPS","TVQ","Total","Status"
//! "2024-03-15","10042","100.00","5.00","9.98","114.98","Unbilled"
//! ...
//! ""
//! "Totals","","<sum subtotal>","<tps>","<tvq>","<total>"
//! ```

use serde::{Deserialize, Serialize};

use crate::csv_io::to_csv;
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, TaxBreakdown};
use crate::types::{AirlineRegistry, TaxSettings, Voucher, VoucherStatus};

// =============================================================================
// Invoice Number
// =============================================================================

/// Derives the invoice code for a restaurant/airline/month combination.
///
/// Returns an empty string when the date, restaurant or airline is empty.
/// Names shorter than three characters are used whole. The date is split on
/// `-` without calendar validation.
///
/// ```rust
/// use voucher_core::invoice::generate_invoice_number;
/// use voucher_core::types::AirlineRegistry;
///
/// let airlines: AirlineRegistry = [("Air Canada".to_string(), "ACD".to_string())]
///     .into_iter()
///     .collect();
///
/// assert_eq!(
///     generate_invoice_number("2024-03-15", "Subway", "Air Canada", &airlines),
///     "SUBACD0324"
/// );
/// assert_eq!(generate_invoice_number("", "Subway", "Air Canada", &airlines), "");
/// ```
pub fn generate_invoice_number(
    date: &str,
    restaurant: &str,
    airline: &str,
    airlines: &AirlineRegistry,
) -> String {
    let (date, restaurant, airline) = (date.trim(), restaurant.trim(), airline.trim());
    if date.is_empty() || restaurant.is_empty() || airline.is_empty() {
        return String::new();
    }

    let restaurant_code = prefix_upper(restaurant);
    let airline_code = airlines
        .code_for(airline)
        .map(str::to_string)
        .unwrap_or_else(|| prefix_upper(airline));

    let mut parts = date.split('-');
    let year = parts.next().unwrap_or_default();
    let month = parts.next().unwrap_or_default();
    let year_chars: Vec<char> = year.chars().collect();
    let short_year: String = year_chars[year_chars.len().saturating_sub(2)..]
        .iter()
        .collect();

    format!("{}{}{}{}", restaurant_code, airline_code, month, short_year)
}

/// First three characters, upper-cased.
fn prefix_upper(name: &str) -> String {
    name.chars().take(3).collect::<String>().to_uppercase()
}

// =============================================================================
// Invoice Batch
// =============================================================================

/// Column headers of the voucher table inside an invoice document.
pub const INVOICE_COLUMNS: [&str; 7] = [
    "POS Receipt Date",
    "Receipt #",
    "Subtotal",
    "TPS",
    "TVQ",
    "Total",
    "Status",
];

/// A set of vouchers billed together to one airline on behalf of one
/// restaurant.
///
/// ## Totals
/// Voucher rows show each voucher's stored tax snapshot. The totals row
/// applies the *current* rates to the summed subtotal, so it can differ from
/// the sum of the rows when rates changed after the vouchers were entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBatch {
    /// Taken from the first selected voucher.
    pub invoice_number: String,
    pub restaurant: String,
    pub airline: String,
    pub vouchers: Vec<Voucher>,
    pub totals: TaxBreakdown,
}

impl InvoiceBatch {
    /// Assembles a batch from the selected vouchers, in selection order.
    ///
    /// ## Errors
    /// - [`CoreError::EmptySelection`] if `vouchers` is empty
    /// - [`CoreError::MixedInvoiceParties`] if restaurant or airline differ
    /// - [`CoreError::InvalidVoucherStatus`] if a voucher is already billed
    pub fn build(vouchers: &[Voucher], taxes: &TaxSettings) -> CoreResult<Self> {
        let first = vouchers.first().ok_or(CoreError::EmptySelection)?;

        for voucher in vouchers {
            if voucher.restaurant != first.restaurant || voucher.airline != first.airline {
                return Err(CoreError::MixedInvoiceParties {
                    expected: format!("{} / {}", first.restaurant, first.airline),
                    found: format!("{} / {}", voucher.restaurant, voucher.airline),
                });
            }
            if voucher.status != VoucherStatus::Unbilled {
                return Err(CoreError::InvalidVoucherStatus {
                    voucher_id: voucher.id.clone(),
                    current_status: voucher.status.to_string(),
                });
            }
        }

        let subtotal: Money = vouchers.iter().map(Voucher::subtotal).sum();

        Ok(InvoiceBatch {
            invoice_number: first.invoice_number.clone(),
            restaurant: first.restaurant.clone(),
            airline: first.airline.clone(),
            vouchers: vouchers.to_vec(),
            totals: taxes.apply(subtotal),
        })
    }

    /// `Invoice_{invoice_number}.csv` for the first document of a month,
    /// `Invoice_{invoice_number}_{n}.csv` for the n-th.
    ///
    /// Characters other than letters, digits, `-` and `_` become `_`, so a
    /// restaurant such as "A/W" never names a directory.
    pub fn file_name(&self, sequence: u32) -> String {
        let stem: String = self
            .invoice_number
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if sequence <= 1 {
            format!("Invoice_{}.csv", stem)
        } else {
            format!("Invoice_{}_{}.csv", stem, sequence)
        }
    }

    /// Ids of the vouchers in the batch.
    pub fn voucher_ids(&self) -> Vec<String> {
        self.vouchers.iter().map(|v| v.id.clone()).collect()
    }

    /// Lays the document out as CSV rows. Blank separator rows are empty.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = vec![
            vec!["Invoice #".to_string(), self.invoice_number.clone()],
            vec!["Restaurant".to_string(), self.restaurant.clone()],
            vec!["Airline".to_string(), self.airline.clone()],
            Vec::new(),
            INVOICE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        ];

        rows.extend(self.vouchers.iter().map(|v| {
            vec![
                v.date_string(),
                v.receipt.clone(),
                v.subtotal().to_amount(),
                v.tps().to_amount(),
                v.tvq().to_amount(),
                v.total().to_amount(),
                v.status.to_string(),
            ]
        }));

        rows.push(Vec::new());
        rows.push(vec![
            "Totals".to_string(),
            String::new(),
            self.totals.subtotal.to_amount(),
            self.totals.tps.to_amount(),
            self.totals.tvq.to_amount(),
            self.totals.total.to_amount(),
        ]);

        rows
    }

    /// Renders the document as CSV text.
    pub fn to_csv(&self) -> CoreResult<String> {
        to_csv(&self.to_rows())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRate;
    use chrono::{NaiveDate, Utc};

    fn airlines() -> AirlineRegistry {
        [
            ("Air Canada".to_string(), "ACD".to_string()),
            ("British Airways".to_string(), "BAW".to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn voucher(id: &str, receipt: &str, airline: &str, subtotal_cents: i64) -> Voucher {
        let taxes = TaxSettings::default().apply(Money::from_cents(subtotal_cents));
        Voucher {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            receipt: receipt.to_string(),
            restaurant: "Subway".to_string(),
            airline: airline.to_string(),
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
    fn test_invoice_number_with_registered_code() {
        assert_eq!(
            generate_invoice_number("2024-03-15", "Subway", "Air Canada", &airlines()),
            "SUBACD0324"
        );
        assert_eq!(
            generate_invoice_number("2023-11-02", "LFD Bagel", "British Airways", &airlines()),
            "LFDBAW1123"
        );
    }

    #[test]
    fn test_invoice_number_falls_back_to_airline_prefix() {
        assert_eq!(
            generate_invoice_number("2024-01-05", "Paramount", "WestJet", &airlines()),
            "PARWES0124"
        );
    }

    #[test]
    fn test_invoice_number_short_names() {
        assert_eq!(
            generate_invoice_number("2024-07-01", "Bo", "Ai", &AirlineRegistry::new()),
            "BOAI0724"
        );
    }

    #[test]
    fn test_invoice_number_empty_inputs() {
        let airlines = airlines();
        assert_eq!(generate_invoice_number("", "Subway", "Air Canada", &airlines), "");
        assert_eq!(generate_invoice_number("2024-03-15", " ", "Air Canada", &airlines), "");
        assert_eq!(generate_invoice_number("2024-03-15", "Subway", "", &airlines), "");
    }

    #[test]
    fn test_build_empty_selection() {
        let err = InvoiceBatch::build(&[], &TaxSettings::default()).unwrap_err();
        assert!(matches!(err, CoreError::EmptySelection));
    }

    #[test]
    fn test_build_rejects_mixed_parties() {
        let selection = vec![
            voucher("a", "1", "Air Canada", 1000),
            voucher("b", "2", "British Airways", 1000),
        ];
        let err = InvoiceBatch::build(&selection, &TaxSettings::default()).unwrap_err();
        assert!(matches!(err, CoreError::MixedInvoiceParties { .. }));
    }

    #[test]
    fn test_build_rejects_billed_voucher() {
        let mut billed = voucher("a", "1", "Air Canada", 1000);
        billed.status = VoucherStatus::Invoiced;
        let err = InvoiceBatch::build(&[billed], &TaxSettings::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidVoucherStatus { .. }));
    }

    #[test]
    fn test_totals_recomputed_at_current_rates() {
        let selection = vec![
            voucher("a", "1", "Air Canada", 10_000),
            voucher("b", "2", "Air Canada", 2_000),
        ];
        let current = TaxSettings {
            tps: TaxRate::from_percentage(5.0),
            tvq: TaxRate::from_percentage(10.0),
        };

        let batch = InvoiceBatch::build(&selection, &current).unwrap();
        assert_eq!(batch.totals.subtotal.cents(), 12_000);
        assert_eq!(batch.totals.tps.cents(), 600);
        assert_eq!(batch.totals.tvq.cents(), 1_200);
        assert_eq!(batch.totals.total.cents(), 13_800);
    }

    #[test]
    fn test_file_name_replaces_path_separators() {
        let mut v = voucher("a", "1", "Air Canada", 1_000);
        v.restaurant = "A/W Grill".to_string();
        v.invoice_number = "A/WACD0324".to_string();
        let batch = InvoiceBatch::build(&[v], &TaxSettings::default()).unwrap();

        assert_eq!(batch.invoice_number, "A/WACD0324");
        assert_eq!(batch.file_name(1), "Invoice_A_WACD0324.csv");
        assert!(!batch.file_name(2).contains('/'));
    }

    #[test]
    fn test_rows_layout() {
        let selection = vec![voucher("a", "10042", "Air Canada", 10_000)];
        let batch = InvoiceBatch::build(&selection, &TaxSettings::default()).unwrap();
        let rows = batch.to_rows();

        assert_eq!(batch.file_name(1), "Invoice_SUBACD0324.csv");
        assert_eq!(batch.file_name(3), "Invoice_SUBACD0324_3.csv");
        assert_eq!(rows[0], vec!["Invoice #", "SUBACD0324"]);
        assert_eq!(rows[1], vec!["Restaurant", "Subway"]);
        assert_eq!(rows[2], vec!["Airline", "Air Canada"]);
        assert!(rows[3].is_empty());
        assert_eq!(rows[4], INVOICE_COLUMNS.to_vec());
        assert_eq!(
            rows[5],
            vec!["2024-03-15", "10042", "100.00", "5.00", "9.98", "114.98", "Unbilled"]
        );
        assert!(rows[6].is_empty());
        assert_eq!(rows[7], vec!["Totals", "", "100.00", "5.00", "9.98", "114.98"]);
    }
}
