use serde::Serialize;

use crate::bill::Billable;
use crate::book::BillBook;

/// Revenue figures shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub corporate_count: usize,
    pub event_count: usize,
    pub corporate_total: u64,
    pub event_total: u64,
    pub total_revenue: u64,
}

impl DashboardSummary {
    pub fn of(book: &BillBook) -> Self {
        let corporate_total = sum_totals(book.corporate_bills());
        let event_total = sum_totals(book.event_bills());
        Self {
            corporate_count: book.corporate_bills().len(),
            event_count: book.event_bills().len(),
            corporate_total,
            event_total,
            total_revenue: corporate_total.saturating_add(event_total),
        }
    }
}

fn sum_totals<B: Billable>(bills: &[B]) -> u64 {
    bills
        .iter()
        .fold(0u64, |acc, b| acc.saturating_add(b.total_amount()))
}
