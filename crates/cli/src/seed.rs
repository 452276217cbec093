//! Sample bills matching the demo data shipped with the dashboard.

use anyhow::Result;
use chrono::NaiveDate;

use cloudkitchen_billing::{BillDraft, CorporateLine, Draft, EventPackage, ItemField};

pub fn sample_drafts() -> Result<Vec<BillDraft>> {
    let date = NaiveDate::from_ymd_opt(2025, 1, 4);

    let mut corporate: Draft<CorporateLine> = Draft::new(date);
    corporate.name = "X Ltd".into();
    corporate.contact_person = "XYZ".into();
    corporate.contact_no = "0178888".into();
    corporate.items.edit(0, ItemField::ServiceDate, "2025-01-01")?;
    corporate.items.edit(0, ItemField::PackageType, "standard")?;
    corporate.items.edit(0, ItemField::Persons, "50")?;
    corporate.items.edit(0, ItemField::UnitPrice, "200")?;

    let mut event: Draft<EventPackage> = Draft::new(date);
    event.name = "X Event".into();
    event.contact_person = "XYZ".into();
    event.contact_no = "0178888".into();
    event.items.edit(0, ItemField::PackageName, "Package-1")?;
    event.items.edit(0, ItemField::FoodItems, "Rice, Chicken, Salad")?;
    event.items.edit(0, ItemField::Persons, "30")?;
    event.items.edit(0, ItemField::UnitPrice, "200")?;

    Ok(vec![BillDraft::Corporate(corporate), BillDraft::Event(event)])
}
