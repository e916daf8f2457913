//! Voucher list filtering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Voucher, VoucherStatus};

/// Criteria for narrowing the voucher list. Unset fields match everything.
///
/// | Field        | Match                                  |
/// |--------------|----------------------------------------|
/// | `airline`    | case-insensitive substring             |
/// | `restaurant` | exact                                  |
/// | `receipt`    | substring                              |
/// | `from`/`to`  | inclusive date bounds                  |
/// | `status`     | exact                                  |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherFilter {
    pub airline: Option<String>,
    pub restaurant: Option<String>,
    pub receipt: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<VoucherStatus>,
}

impl VoucherFilter {
    pub fn matches(&self, voucher: &Voucher) -> bool {
        if let Some(airline) = non_empty(&self.airline) {
            if !voucher
                .airline
                .to_lowercase()
                .contains(&airline.to_lowercase())
            {
                return false;
            }
        }
        if let Some(restaurant) = non_empty(&self.restaurant) {
            if voucher.restaurant != restaurant {
                return false;
            }
        }
        if let Some(receipt) = non_empty(&self.receipt) {
            if !voucher.receipt.contains(receipt) {
                return false;
            }
        }
        if self.from.is_some_and(|from| voucher.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| voucher.date > to) {
            return false;
        }
        if self.status.is_some_and(|status| voucher.status != status) {
            return false;
        }
        true
    }

    /// Keeps the matching vouchers, preserving order.
    pub fn apply<'a>(&self, vouchers: &'a [Voucher]) -> Vec<&'a Voucher> {
        vouchers.iter().filter(|v| self.matches(v)).collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
