//! Billing domain module.
//!
//! Line items, bill totals, amount-in-words, bill records, the bill book state
//! machine and the invoice presenter. Everything here is deterministic domain
//! logic: no storage and no terminal/browser concerns.

pub mod bill;
pub mod book;
pub mod format;
pub mod invoice;
pub mod line_item;
pub mod summary;
pub mod totals;
pub mod words;

pub use bill::{Bill, BillDraft, BillPatch, Billable, BillingType, CorporateBill, Draft, EventBill};
pub use book::{BillBook, BillCommand, BillEvent};
pub use invoice::{InvoiceSections, RenderError, render};
pub use line_item::{
    CorporateLine, EventPackage, ItemField, LineItem, LineItems, PackageType, Pricing, coerce_count,
};
pub use summary::DashboardSummary;
pub use totals::{Totals, aggregate};
pub use words::{CURRENCY, amount_in_words};
