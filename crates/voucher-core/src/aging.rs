//! # Aging Report
//!
//! Groups the totals of unbilled vouchers by how long they have waited.
//!
//! ```text
//!   today - voucher.date (days)
//!   ───────────────────────────────────────────────────────────────►
//!   ≤ 30        │ 31 ..= 60   │ 61 ..= 90   │ > 90
//!   "0-30"      │ "31-60"     │ "61-90"     │ "90+"
//! ```
//!
//! The caller passes "today" in, so reports are reproducible and tests never
//! depend on the wall clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Voucher, VoucherStatus};

/// File name of the exported aging report.
pub const AGING_REPORT_FILE_NAME: &str = "AgingReport.csv";

/// An age range in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    Current,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    /// All buckets, youngest first.
    pub const ALL: [AgingBucket; 4] = [
        AgingBucket::Current,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    /// Bucket for an age in days. Negative ages (future-dated vouchers) land
    /// in the first bucket.
    pub fn for_age(days: i64) -> Self {
        match days {
            d if d <= 30 => AgingBucket::Current,
            d if d <= 60 => AgingBucket::Days31To60,
            d if d <= 90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            AgingBucket::Current => "0-30",
            AgingBucket::Days31To60 => "31-60",
            AgingBucket::Days61To90 => "61-90",
            AgingBucket::Over90 => "90+",
        }
    }

    const fn index(&self) -> usize {
        match self {
            AgingBucket::Current => 0,
            AgingBucket::Days31To60 => 1,
            AgingBucket::Days61To90 => 2,
            AgingBucket::Over90 => 3,
        }
    }
}

/// Accumulated totals per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgingBuckets([Money; 4]);

impl AgingBuckets {
    pub fn get(&self, bucket: AgingBucket) -> Money {
        self.0[bucket.index()]
    }

    fn add(&mut self, bucket: AgingBucket, amount: Money) {
        self.0[bucket.index()] += amount;
    }

    /// Sum over all buckets.
    pub fn total(&self) -> Money {
        self.0.iter().copied().sum()
    }

    /// `(label, amount)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Money)> + '_ {
        AgingBucket::ALL.iter().map(move |b| (b.label(), self.get(*b)))
    }

    /// Header row of labels plus `Total Unbilled`, then one row of amounts.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut header: Vec<String> = AgingBucket::ALL.iter().map(|b| b.label().to_string()).collect();
        header.push("Total Unbilled".to_string());

        let mut amounts: Vec<String> = self.0.iter().map(Money::to_amount).collect();
        amounts.push(self.total().to_amount());

        vec![header, amounts]
    }
}

/// Buckets the totals of `Unbilled` vouchers by age relative to `today`.
///
/// Invoiced and paid vouchers are skipped entirely.
pub fn calculate_aging_buckets(vouchers: &[Voucher], today: NaiveDate) -> AgingBuckets {
    vouchers
        .iter()
        .filter(|v| v.status == VoucherStatus::Unbilled)
        .fold(AgingBuckets::default(), |mut buckets, v| {
            let age = (today - v.date).num_days();
            buckets.add(AgingBucket::for_age(age), v.total());
            buckets
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn voucher(days_ago: i64, total_cents: i64, status: VoucherStatus) -> Voucher {
        Voucher {
            id: format!("v{}", days_ago),
            date: today() - Duration::days(days_ago),
            receipt: format!("R{}", days_ago),
            restaurant: "Subway".to_string(),
            airline: "Air Canada".to_string(),
            subtotal_cents: total_cents,
            tps_cents: 0,
            tvq_cents: 0,
            total_cents,
            invoice_number: "SUBACD0624".to_string(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        let cases = [
            (30, AgingBucket::Current),
            (31, AgingBucket::Days31To60),
            (60, AgingBucket::Days31To60),
            (61, AgingBucket::Days61To90),
            (90, AgingBucket::Days61To90),
            (91, AgingBucket::Over90),
        ];
        for (days, expected) in cases {
            let buckets = calculate_aging_buckets(
                &[voucher(days, 1_000, VoucherStatus::Unbilled)],
                today(),
            );
            assert_eq!(buckets.get(expected).cents(), 1_000, "age {} days", days);
            assert_eq!(buckets.total().cents(), 1_000);
        }
    }

    #[test]
    fn test_only_unbilled_counted() {
        let vouchers = vec![
            voucher(5, 1_000, VoucherStatus::Unbilled),
            voucher(6, 2_000, VoucherStatus::Invoiced),
            voucher(100, 4_000, VoucherStatus::Paid),
        ];
        let buckets = calculate_aging_buckets(&vouchers, today());
        assert_eq!(buckets.get(AgingBucket::Current).cents(), 1_000);
        assert_eq!(buckets.get(AgingBucket::Over90).cents(), 0);
        assert_eq!(buckets.total().cents(), 1_000);
    }

    #[test]
    fn test_future_dated_voucher_is_current() {
        let buckets = calculate_aging_buckets(&[voucher(-3, 500, VoucherStatus::Unbilled)], today());
        assert_eq!(buckets.get(AgingBucket::Current).cents(), 500);
    }

    #[test]
    fn test_accumulates_totals_not_subtotals() {
        let mut v = voucher(10, 11_498, VoucherStatus::Unbilled);
        v.subtotal_cents = 10_000;
        let buckets = calculate_aging_buckets(&[v.clone(), v], today());
        assert_eq!(buckets.get(AgingBucket::Current).cents(), 22_996);
    }

    #[test]
    fn test_to_rows() {
        let vouchers = vec![
            voucher(1, 1_050, VoucherStatus::Unbilled),
            voucher(45, 200, VoucherStatus::Unbilled),
        ];
        let rows = calculate_aging_buckets(&vouchers, today()).to_rows();
        assert_eq!(rows[0], vec!["0-30", "31-60", "61-90", "90+", "Total Unbilled"]);
        assert_eq!(rows[1], vec!["10.50", "2.00", "0.00", "0.00", "12.50"]);
    }
}
