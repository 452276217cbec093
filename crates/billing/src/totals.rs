use serde::{Deserialize, Serialize};

use cloudkitchen_core::ValueObject;

use crate::line_item::LineItem;

/// Bill totals derived from its line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_amount: u64,
    pub total_persons: u64,
}

impl ValueObject for Totals {}

/// Sum line totals and persons. Empty input yields zero totals.
pub fn aggregate<'a, T, I>(items: I) -> Totals
where
    T: LineItem + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().fold(Totals::default(), |acc, item| Totals {
        total_amount: acc.total_amount.saturating_add(item.line_total()),
        total_persons: acc.total_persons.saturating_add(item.persons()),
    })
}
