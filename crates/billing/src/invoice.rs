//! Invoice presenter: maps a stored bill to printable sections.
//!
//! Rendering is read-only; the bill is never written back. Free text taken from
//! a bill (names, contacts, menus) is treated as opaque text: the HTML output
//! escapes it, the plain-text output prints it verbatim.

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::bill::{Bill, Billable};
use crate::format::{self, day_month_year, fixed2};
use crate::line_item::LineItem;
use crate::words::CURRENCY;

const HTML_TEMPLATE: &str = include_str!("../templates/invoice.html.tera");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invoice template failed: {0}")]
    Template(#[from] tera::Error),
}

/// Issuer identity printed at the top of every invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompanyProfile {
    pub name: &'static str,
    pub address: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
}

pub const COMPANY: CompanyProfile = CompanyProfile {
    name: "Cloud Kitchen Limited",
    address: "Dhaka, Bangladesh",
    phone: "+88017xxxxxxx",
    email: "billing@cloudkitchen.com",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillInfo {
    pub invoice_no: String,
    /// `dd/mm/yyyy`.
    pub invoice_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientBlock {
    pub name: String,
    pub contact_person: String,
    pub contact_no: String,
    pub billing_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRow {
    /// 1-based.
    pub sl_no: usize,
    pub details: [String; 2],
    pub persons: u64,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemTable {
    pub title: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<ItemRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceSummary {
    pub package_count: u64,
    /// Re-derived from the rows; equals `package_count` for a consistent bill.
    pub person_count: u64,
    pub subtotal: String,
    pub subtotal_note: &'static str,
    /// Headline figure with digit grouping.
    pub total: String,
    pub amount_in_words: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub thanks: &'static str,
    pub queries: String,
    pub issuer_signature: &'static str,
    pub issuer_department: &'static str,
    pub customer_signature: &'static str,
    pub customer_name: String,
}

/// Everything a printable invoice shows, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceSections {
    pub company: CompanyProfile,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub currency: &'static str,
    pub bill_info: BillInfo,
    pub client: ClientBlock,
    pub table: ItemTable,
    pub summary: InvoiceSummary,
    pub footer: Footer,
}

/// Build invoice sections for a stored bill.
pub fn render(bill: &Bill) -> InvoiceSections {
    match bill {
        Bill::Corporate(b) => render_billable(b),
        Bill::Event(b) => render_billable(b),
    }
}

pub fn render_billable<B: Billable>(bill: &B) -> InvoiceSections {
    let rows: Vec<ItemRow> = bill
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| ItemRow {
            sl_no: i + 1,
            details: item.detail_cells(),
            persons: item.persons(),
            unit_price: fixed2(item.unit_price()),
            line_total: fixed2(item.line_total()),
        })
        .collect();
    let person_count = bill
        .items()
        .iter()
        .fold(0u64, |acc, item| acc.saturating_add(item.persons()));

    let [detail_a, detail_b] = <B::Item as LineItem>::DETAIL_COLUMNS;

    InvoiceSections {
        company: COMPANY,
        title: "TAX INVOICE",
        subtitle: "Billing System",
        currency: CURRENCY,
        bill_info: BillInfo {
            invoice_no: bill.id().to_string(),
            invoice_date: day_month_year(bill.date()),
        },
        client: ClientBlock {
            name: bill.name().to_string(),
            contact_person: bill.contact_person().to_string(),
            contact_no: bill.contact_no().to_string(),
            billing_type: bill.billing_type().as_str(),
        },
        table: ItemTable {
            title: <B::Item as LineItem>::TABLE_TITLE,
            columns: vec![
                "SL No.",
                detail_a,
                detail_b,
                "Persons",
                "Unit Price (BDT)",
                "Total (BDT)",
            ],
            rows,
        },
        summary: InvoiceSummary {
            package_count: bill.total_packages(),
            person_count,
            subtotal: fixed2(bill.total_amount()),
            subtotal_note: "(Excluding VAT/Tax)",
            total: format::grouped(bill.total_amount()),
            amount_in_words: bill.amount_in_words().to_string(),
        },
        footer: Footer {
            thanks: "Thank you for your business!",
            queries: format!("For any queries, contact: {}", COMPANY.email),
            issuer_signature: "Authorized Signature",
            issuer_department: "Accounts Department",
            customer_signature: "Customer Signature",
            customer_name: bill.contact_person().to_string(),
        },
    }
}

impl InvoiceSections {
    /// Printable HTML page. Every interpolated value is escaped.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let context = Context::from_serialize(self)?;
        Ok(Tera::one_off(HTML_TEMPLATE, &context, true)?)
    }
}

impl core::fmt::Display for InvoiceSections {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let c = &self.company;
        writeln!(f, "{}", c.name)?;
        writeln!(f, "{}", c.address)?;
        writeln!(f, "Phone: {}", c.phone)?;
        writeln!(f, "Email: {}", c.email)?;
        writeln!(f)?;
        writeln!(f, "{} - {}", self.title, self.subtitle)?;
        writeln!(f, "Invoice No: {}", self.bill_info.invoice_no)?;
        writeln!(f, "Invoice Date: {}", self.bill_info.invoice_date)?;
        writeln!(f)?;
        writeln!(f, "Bill To:")?;
        writeln!(f, "  Name: {}", self.client.name)?;
        writeln!(f, "  Contact Person: {}", self.client.contact_person)?;
        writeln!(f, "  Contact No: {}", self.client.contact_no)?;
        writeln!(f, "  Billing Type: {}", self.client.billing_type)?;
        writeln!(f)?;
        writeln!(f, "{}", self.table.title)?;
        writeln!(f, "{}", self.table.columns.join(" | "))?;
        for row in &self.table.rows {
            writeln!(
                f,
                "{} | {} | {} | {} | {} | {}",
                row.sl_no, row.details[0], row.details[1], row.persons, row.unit_price, row.line_total
            )?;
        }
        writeln!(f)?;
        let s = &self.summary;
        writeln!(f, "Number of Packages: {}", s.package_count)?;
        writeln!(f, "Total Persons: {}", s.person_count)?;
        writeln!(f, "Subtotal: {} {} {}", self.currency, s.subtotal, s.subtotal_note)?;
        writeln!(f, "Total Amount: {} {}", self.currency, s.total)?;
        writeln!(f, "Amount in Words: {}", s.amount_in_words)?;
        writeln!(f)?;
        writeln!(f, "{}", self.footer.thanks)?;
        write!(f, "{}", self.footer.queries)
    }
}
