use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::{Attribute, Cell, CellAlignment, Table};

use cloudkitchen_billing::{
    Bill, BillCommand, BillDraft, BillEvent, BillPatch, DashboardSummary, format, render,
};
use cloudkitchen_core::BillId;
use cloudkitchen_storage::{BillStore, FileKeyValueStore};

use crate::config::Settings;
use crate::seed;

pub type Store = BillStore<FileKeyValueStore>;

pub fn open_store(settings: &Settings) -> Result<Store> {
    let dir = settings.data_dir()?;
    tracing::debug!(dir = %dir.display(), "opening bill store");
    BillStore::open(FileKeyValueStore::new(&dir))
        .with_context(|| format!("failed to open bill store in {}", dir.display()))
}

fn parse_id(raw: &str) -> Result<BillId> {
    Ok(raw.parse()?)
}

fn find(store: &Store, raw: &str) -> Result<Bill> {
    let id = parse_id(raw)?;
    store
        .book()
        .find(&id)
        .with_context(|| format!("no bill with id {id}"))
}

fn read_draft(path: &Path) -> Result<BillDraft> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read draft from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read draft {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("invalid bill draft in {}", path.display()))
}

fn stored_bill(events: &[BillEvent]) -> Option<&Bill> {
    events.iter().find_map(|e| match e {
        BillEvent::BillAdded(b) | BillEvent::BillReplaced(b) => Some(b),
        _ => None,
    })
}

pub fn list(store: &Store) -> Result<()> {
    let summary = DashboardSummary::of(store.book());
    println!(
        "Corporate: BDT {} ({} bills)",
        format::grouped(summary.corporate_total),
        summary.corporate_count
    );
    println!(
        "Event:     BDT {} ({} bills)",
        format::grouped(summary.event_total),
        summary.event_count
    );
    println!("Revenue:   BDT {}", format::grouped(summary.total_revenue));

    let bills = store.book().bills();
    if bills.is_empty() {
        println!("\nNo bills stored.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Contact").add_attribute(Attribute::Bold),
        Cell::new("Total (BDT)").add_attribute(Attribute::Bold),
    ]);
    for bill in &bills {
        table.add_row(vec![
            Cell::new(bill.id()),
            Cell::new(bill.billing_type()),
            Cell::new(bill.name()),
            Cell::new(format::day_month_year(bill.date())),
            Cell::new(format!("{} / {}", bill.contact_person(), bill.contact_no())),
            Cell::new(format::grouped(bill.total_amount())).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\n{table}");
    println!("Showing {} bills", bills.len());
    Ok(())
}

pub fn show(store: &Store, id: &str, html: Option<&Path>, json: bool) -> Result<()> {
    let bill = find(store, id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&bill)?);
        return Ok(());
    }

    let invoice = render(&bill);
    match html {
        Some(path) => {
            let page = invoice.to_html()?;
            fs::write(path, page)
                .with_context(|| format!("failed to write invoice to {}", path.display()))?;
            println!("Invoice {} written to {}", bill.id(), path.display());
        }
        None => println!("{invoice}"),
    }
    Ok(())
}

pub fn add(store: &mut Store, draft: &Path) -> Result<()> {
    let draft = read_draft(draft)?;
    let events = store.dispatch(&BillCommand::AddBill(draft))?;
    if let Some(bill) = stored_bill(&events) {
        println!(
            "Bill created: {} ({}) BDT {}",
            bill.id(),
            bill.billing_type(),
            format::grouped(bill.total_amount())
        );
    }
    Ok(())
}

pub fn replace(store: &mut Store, id: &str, draft: &Path) -> Result<()> {
    let id = parse_id(id)?;
    let draft = read_draft(draft)?;
    let events = store.dispatch(&BillCommand::ReplaceBill { id, draft })?;
    if let Some(bill) = stored_bill(&events) {
        println!(
            "Bill updated: {} BDT {}",
            bill.id(),
            format::grouped(bill.total_amount())
        );
    }
    Ok(())
}

pub fn edit(store: &mut Store, id: &str, patch: BillPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("nothing to change; pass at least one of --name, --contact-person, --contact-no, --date");
    }
    let id = parse_id(id)?;
    store.dispatch(&BillCommand::PatchBill {
        id: id.clone(),
        patch,
    })?;
    println!("Bill updated: {id}");
    Ok(())
}

pub fn delete(store: &mut Store, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    store.dispatch(&BillCommand::DeleteBill(id.clone()))?;
    println!("Bill deleted: {id}");
    Ok(())
}

pub fn reset(store: &mut Store, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to delete ALL bills without --yes");
    }
    let count = store.book().len();
    store.dispatch(&BillCommand::ResetBills)?;
    println!("Deleted {count} bills");
    Ok(())
}

pub fn seed(store: &mut Store) -> Result<()> {
    for draft in seed::sample_drafts()? {
        add_draft(store, draft)?;
    }
    Ok(())
}

fn add_draft(store: &mut Store, draft: BillDraft) -> Result<()> {
    let events = store.dispatch(&BillCommand::AddBill(draft))?;
    if let Some(bill) = stored_bill(&events) {
        println!("Bill created: {} ({})", bill.id(), bill.billing_type());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use cloudkitchen_observability::LogFormat;
    use cloudkitchen_storage::{KeyValueStore, STORAGE_KEY};

    use super::*;

    fn temp_store(tag: &str) -> (Store, PathBuf) {
        let dir = std::env::temp_dir().join(format!("cloudkitchen-cli-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let settings = Settings {
            data_dir: Some(dir.clone()),
            log_format: LogFormat::Pretty,
        };
        (open_store(&settings).unwrap(), dir)
    }

    #[test]
    fn edit_without_changes_is_refused_before_touching_storage() {
        let (mut store, dir) = temp_store("edit");
        seed(&mut store).unwrap();
        let before = store.storage().get(STORAGE_KEY).unwrap();

        let err = edit(&mut store, "CORP-0001", BillPatch::default()).unwrap_err();
        assert!(err.to_string().contains("nothing to change"));
        assert_eq!(store.storage().get(STORAGE_KEY).unwrap(), before);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reset_requires_confirmation() {
        let (mut store, dir) = temp_store("reset");
        seed(&mut store).unwrap();

        let err = reset(&mut store, false).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(store.book().len(), 2);

        reset(&mut store, true).unwrap();
        assert!(store.book().is_empty());
        assert_eq!(store.storage().get(STORAGE_KEY).unwrap(), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_bill_is_reported() {
        let (store, dir) = temp_store("show");
        let err = show(&store, "EVT-0042", None, false).unwrap_err();
        assert!(err.to_string().contains("no bill with id EVT-0042"));
        let _ = fs::remove_dir_all(&dir);
    }
}
