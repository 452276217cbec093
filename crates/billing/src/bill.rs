use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cloudkitchen_core::{BillId, DomainError, DomainResult};

use crate::format;
use crate::line_item::{CorporateLine, EventPackage, LineItem, LineItems};
use crate::totals::{Totals, aggregate};
use crate::words::amount_in_words;

/// Bill category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingType {
    Corporate,
    Event,
}

impl BillingType {
    /// Prefix of ids minted for this category.
    pub fn id_prefix(self) -> &'static str {
        match self {
            BillingType::Corporate => "CORP",
            BillingType::Event => "EVT",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BillingType::Corporate => "Corporate",
            BillingType::Event => "Event",
        }
    }
}

impl core::fmt::Display for BillingType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable view of the header fields every bill has.
pub struct HeaderMut<'a> {
    pub name: &'a mut String,
    pub contact_person: &'a mut String,
    pub contact_no: &'a mut String,
    pub date: &'a mut Option<NaiveDate>,
}

/// Read access shared by corporate and event bills.
pub trait Billable {
    type Item: LineItem;

    const BILLING_TYPE: BillingType;

    fn id(&self) -> &BillId;

    /// Corporate name or event name.
    fn name(&self) -> &str;

    fn contact_person(&self) -> &str;

    fn contact_no(&self) -> &str;

    /// Billing date or event date.
    fn date(&self) -> Option<NaiveDate>;

    fn items(&self) -> &LineItems<Self::Item>;

    /// Frozen at submission time.
    fn total_amount(&self) -> u64;

    /// Frozen at submission time.
    fn total_packages(&self) -> u64;

    fn amount_in_words(&self) -> &str;

    fn header_mut(&mut self) -> HeaderMut<'_>;

    fn billing_type(&self) -> BillingType {
        Self::BILLING_TYPE
    }
}

/// Persisted corporate bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateBill {
    pub id: BillId,
    #[serde(default)]
    pub corporate_name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default, with = "format::optional_date")]
    pub billing_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_packages: u64,
    #[serde(default)]
    pub line_items: LineItems<CorporateLine>,
    #[serde(default)]
    pub total_amount: u64,
    #[serde(default)]
    pub amount_in_words: String,
}

/// Persisted event bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBill {
    pub id: BillId,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default, with = "format::optional_date")]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_packages: u64,
    #[serde(default)]
    pub packages: LineItems<EventPackage>,
    #[serde(default)]
    pub total_amount: u64,
    #[serde(default)]
    pub amount_in_words: String,
}

macro_rules! impl_billable {
    ($bill:ty, $item:ty, $kind:ident, $name:ident, $date:ident, $items:ident) => {
        impl Billable for $bill {
            type Item = $item;

            const BILLING_TYPE: BillingType = BillingType::$kind;

            fn id(&self) -> &BillId {
                &self.id
            }

            fn name(&self) -> &str {
                &self.$name
            }

            fn contact_person(&self) -> &str {
                &self.contact_person
            }

            fn contact_no(&self) -> &str {
                &self.contact_no
            }

            fn date(&self) -> Option<NaiveDate> {
                self.$date
            }

            fn items(&self) -> &LineItems<$item> {
                &self.$items
            }

            fn total_amount(&self) -> u64 {
                self.total_amount
            }

            fn total_packages(&self) -> u64 {
                self.total_packages
            }

            fn amount_in_words(&self) -> &str {
                &self.amount_in_words
            }

            fn header_mut(&mut self) -> HeaderMut<'_> {
                HeaderMut {
                    name: &mut self.$name,
                    contact_person: &mut self.contact_person,
                    contact_no: &mut self.contact_no,
                    date: &mut self.$date,
                }
            }
        }

        impl $bill {
            /// Freeze a validated draft into a record: totals and words are
            /// computed once here and not kept live.
            pub fn from_draft(id: BillId, draft: &Draft<$item>) -> Self {
                let totals = draft.totals();
                Self {
                    id,
                    $name: draft.name.trim().to_string(),
                    contact_person: draft.contact_person.trim().to_string(),
                    contact_no: draft.contact_no.trim().to_string(),
                    $date: draft.date,
                    total_packages: totals.total_persons,
                    $items: draft.items.clone(),
                    total_amount: totals.total_amount,
                    amount_in_words: amount_in_words(totals.total_amount),
                }
            }
        }
    };
}

impl_billable!(CorporateBill, CorporateLine, Corporate, corporate_name, billing_date, line_items);
impl_billable!(EventBill, EventPackage, Event, event_name, event_date, packages);

/// A bill of either category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "billingType")]
pub enum Bill {
    Corporate(CorporateBill),
    Event(EventBill),
}

macro_rules! with_bill {
    ($bill:expr, $b:ident => $body:expr) => {
        match $bill {
            Bill::Corporate($b) => $body,
            Bill::Event($b) => $body,
        }
    };
}

impl Bill {
    pub fn id(&self) -> &BillId {
        with_bill!(self, b => b.id())
    }

    pub fn billing_type(&self) -> BillingType {
        with_bill!(self, b => b.billing_type())
    }

    pub fn name(&self) -> &str {
        with_bill!(self, b => b.name())
    }

    pub fn contact_person(&self) -> &str {
        with_bill!(self, b => b.contact_person())
    }

    pub fn contact_no(&self) -> &str {
        with_bill!(self, b => b.contact_no())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        with_bill!(self, b => b.date())
    }

    pub fn item_count(&self) -> usize {
        with_bill!(self, b => b.items().len())
    }

    pub fn total_amount(&self) -> u64 {
        with_bill!(self, b => b.total_amount())
    }

    pub fn total_packages(&self) -> u64 {
        with_bill!(self, b => b.total_packages())
    }

    pub fn amount_in_words(&self) -> &str {
        with_bill!(self, b => b.amount_in_words())
    }
}

/// Bill form payload, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Draft<T> {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default, with = "format::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub items: LineItems<T>,
}

impl<T: LineItem> Draft<T> {
    /// Blank form with a single fresh line item.
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            name: String::new(),
            contact_person: String::new(),
            contact_no: String::new(),
            date,
            items: LineItems::with_first(),
        }
    }

    /// Required-field checks run before a record is built.
    pub fn validate(&self) -> DomainResult<()> {
        require("name", &self.name)?;
        require("contact person", &self.contact_person)?;
        require("contact number", &self.contact_no)?;
        if self.date.is_none() {
            return Err(DomainError::validation("date is required"));
        }
        if self.items.is_empty() {
            return Err(DomainError::validation(
                "a bill needs at least one line item",
            ));
        }
        Ok(())
    }

    /// Live totals, as shown while the form is being edited.
    pub fn totals(&self) -> Totals {
        aggregate(&self.items)
    }
}

fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Bill form payload of either category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "billingType")]
pub enum BillDraft {
    Corporate(Draft<CorporateLine>),
    Event(Draft<EventPackage>),
}

impl BillDraft {
    pub fn billing_type(&self) -> BillingType {
        match self {
            BillDraft::Corporate(_) => BillingType::Corporate,
            BillDraft::Event(_) => BillingType::Event,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        match self {
            BillDraft::Corporate(d) => d.validate(),
            BillDraft::Event(d) => d.validate(),
        }
    }

    pub fn totals(&self) -> Totals {
        match self {
            BillDraft::Corporate(d) => d.totals(),
            BillDraft::Event(d) => d.totals(),
        }
    }

    /// Validate, then freeze into a record carrying `id`.
    pub fn finalize(&self, id: BillId) -> DomainResult<Bill> {
        self.validate()?;
        Ok(match self {
            BillDraft::Corporate(d) => Bill::Corporate(CorporateBill::from_draft(id, d)),
            BillDraft::Event(d) => Bill::Event(EventBill::from_draft(id, d)),
        })
    }
}

/// Partial header update. Items and frozen totals are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl BillPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_person.is_none()
            && self.contact_no.is_none()
            && self.date.is_none()
    }

    /// Provided text fields must not be blank.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(v) = &self.name {
            require("name", v)?;
        }
        if let Some(v) = &self.contact_person {
            require("contact person", v)?;
        }
        if let Some(v) = &self.contact_no {
            require("contact number", v)?;
        }
        Ok(())
    }

    pub fn apply_to<B: Billable>(&self, bill: &mut B) {
        let header = bill.header_mut();
        if let Some(v) = &self.name {
            *header.name = v.trim().to_string();
        }
        if let Some(v) = &self.contact_person {
            *header.contact_person = v.trim().to_string();
        }
        if let Some(v) = &self.contact_no {
            *header.contact_no = v.trim().to_string();
        }
        if let Some(d) = self.date {
            *header.date = Some(d);
        }
    }
}
