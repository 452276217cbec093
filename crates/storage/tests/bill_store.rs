use std::cell::Cell;
use std::sync::Arc;

use chrono::NaiveDate;

use cloudkitchen_billing::{
    BillCommand, BillDraft, BillPatch, CorporateLine, Draft, EventPackage, ItemField, LineItem,
};
use cloudkitchen_core::{BillId, DomainError};
use cloudkitchen_storage::{
    BACKUP_KEY, BillStore, FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, STORAGE_KEY,
    StorageError, StoreError, decode_book, encode_book,
};

fn draft<T: LineItem>(name: &str, persons: &str, unit_price: &str) -> Draft<T> {
    let mut d = Draft::new(NaiveDate::from_ymd_opt(2025, 1, 4));
    d.name = name.into();
    d.contact_person = "XYZ".into();
    d.contact_no = "0178888".into();
    d.items.edit(0, ItemField::Persons, persons).unwrap();
    d.items.edit(0, ItemField::UnitPrice, unit_price).unwrap();
    d
}

fn corporate(persons: &str, unit_price: &str) -> BillCommand {
    let mut d: Draft<CorporateLine> = draft("X Ltd", persons, unit_price);
    d.items.edit(0, ItemField::ServiceDate, "2025-01-01").unwrap();
    BillCommand::AddBill(BillDraft::Corporate(d))
}

fn event(persons: &str, unit_price: &str) -> BillCommand {
    let mut d: Draft<EventPackage> = draft("X Event", persons, unit_price);
    d.items.edit(0, ItemField::PackageName, "Package-1").unwrap();
    d.items.edit(0, ItemField::FoodItems, "Rice, Chicken, Salad").unwrap();
    BillCommand::AddBill(BillDraft::Event(d))
}

fn triples(store: &BillStore<impl KeyValueStore>) -> Vec<(String, u64, u64, String)> {
    store
        .book()
        .bills()
        .iter()
        .map(|b| {
            (
                b.id().to_string(),
                b.total_amount(),
                b.total_packages(),
                b.amount_in_words().to_string(),
            )
        })
        .collect()
}

/// Port whose writes fail once `fail_writes` is set.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryKeyValueStore,
    fail_writes: Cell<bool>,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Unavailable("quota exceeded".into()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[test]
fn corporate_bill_end_to_end() {
    let mut store = BillStore::open(InMemoryKeyValueStore::new()).unwrap();
    store.dispatch(&corporate("50", "200")).unwrap();

    let bill = store.book().find(&"CORP-0001".parse().unwrap()).unwrap();
    assert_eq!(bill.total_amount(), 10_000);
    assert_eq!(bill.total_packages(), 50);
    assert_eq!(bill.amount_in_words(), "BDT Ten Thousand Only");
}

#[test]
fn event_bill_end_to_end() {
    let mut store = BillStore::open(InMemoryKeyValueStore::new()).unwrap();
    store.dispatch(&event("30", "200")).unwrap();

    let bill = store.book().find(&"EVT-0001".parse().unwrap()).unwrap();
    assert_eq!(bill.total_amount(), 6_000);
    assert_eq!(bill.total_packages(), 30);
    assert_eq!(bill.amount_in_words(), "BDT Six Thousand Only");
}

#[test]
fn every_mutation_is_mirrored_and_reloads_identically() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let mut store = BillStore::open(Arc::clone(&kv)).unwrap();

    store.dispatch(&corporate("50", "200")).unwrap();
    store.dispatch(&event("30", "200")).unwrap();
    store.dispatch(&event("12", "400")).unwrap();
    store
        .dispatch(&BillCommand::PatchBill {
            id: "EVT-0002".parse().unwrap(),
            patch: BillPatch::rename("Wedding"),
        })
        .unwrap();

    let reopened = BillStore::open(Arc::clone(&kv)).unwrap();
    assert_eq!(triples(&reopened), triples(&store));
    assert_eq!(reopened.book().bills(), store.book().bills());
    assert_eq!(
        reopened.book().find(&"EVT-0002".parse().unwrap()).unwrap().name(),
        "Wedding"
    );
}

#[test]
fn snapshot_roundtrip_preserves_totals() {
    let mut store = BillStore::open(InMemoryKeyValueStore::new()).unwrap();
    store.dispatch(&corporate("50", "200")).unwrap();
    store.dispatch(&event("30", "200")).unwrap();

    let blob = encode_book(store.book()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(json["corporateBills"][0]["corporateName"], "X Ltd");
    assert_eq!(json["eventBills"][0]["packages"][0]["packageName"], "Package-1");

    let decoded = decode_book(Some(blob.as_str()));
    assert_eq!(&decoded.bills(), &store.book().bills());
}

#[test]
fn file_store_survives_reopen() {
    let dir = std::env::temp_dir().join(format!("cloudkitchen-it-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let mut store = BillStore::open(FileKeyValueStore::new(&dir)).unwrap();
    assert!(store.book().is_empty());
    store.dispatch(&corporate("50", "200")).unwrap();
    let before = triples(&store);

    let reopened = BillStore::open(FileKeyValueStore::new(&dir)).unwrap();
    assert_eq!(triples(&reopened), before);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_mirror_is_surfaced_and_memory_keeps_the_change() {
    let mut store = BillStore::open(FlakyStore::default()).unwrap();
    store.dispatch(&corporate("1", "100")).unwrap();

    store.storage().fail_writes.set(true);
    let err = store.dispatch(&event("30", "200")).unwrap_err();
    assert!(matches!(err, StoreError::Storage(StorageError::Unavailable(_))));
    assert_eq!(store.book().len(), 2);

    // Storage still holds the pre-failure snapshot.
    let stored = store.storage().get(STORAGE_KEY).unwrap();
    assert_eq!(decode_book(stored.as_deref()).len(), 1);

    // The next successful write catches up.
    store.storage().fail_writes.set(false);
    store
        .dispatch(&BillCommand::DeleteBill("CORP-0001".parse().unwrap()))
        .unwrap();
    let stored = store.storage().get(STORAGE_KEY).unwrap();
    let book = decode_book(stored.as_deref());
    assert_eq!(book.len(), 1);
    assert_eq!(book.event_bills()[0].id.as_str(), "EVT-0001");
}

#[test]
fn rejected_command_writes_nothing() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let mut store = BillStore::open(Arc::clone(&kv)).unwrap();

    let id: BillId = "CORP-0404".parse().unwrap();
    let err = store.dispatch(&BillCommand::DeleteBill(id)).unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::NotFound(_))));
    assert_eq!(kv.get(STORAGE_KEY).unwrap(), None);
}

#[test]
fn reset_removes_the_stored_key() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let mut store = BillStore::open(Arc::clone(&kv)).unwrap();
    store.dispatch(&corporate("50", "200")).unwrap();
    store.dispatch(&event("30", "200")).unwrap();
    assert!(kv.get(STORAGE_KEY).unwrap().is_some());

    store.dispatch(&BillCommand::ResetBills).unwrap();
    assert!(store.book().is_empty());
    assert_eq!(kv.get(STORAGE_KEY).unwrap(), None);
}

#[test]
fn undecodable_blob_opens_as_empty_book_and_is_backed_up() {
    let raw = "{\"corporateBills\": 42}";
    let kv = InMemoryKeyValueStore::new();
    kv.set(STORAGE_KEY, raw).unwrap();

    let mut store = BillStore::open(kv).unwrap();
    assert!(store.book().is_empty());
    store.dispatch(&event("30", "200")).unwrap();
    assert_eq!(store.book().len(), 1);
    assert_eq!(store.storage().get(BACKUP_KEY).unwrap().as_deref(), Some(raw));
}

#[test]
fn one_bad_record_keeps_the_rest_across_a_write() {
    let raw = r#"{
      "corporateBills": [
        {"id": "CORP-0001", "corporateName": "A Ltd", "totalAmount": 100,
         "lineItems": [{"id": 1, "persons": 1, "unitPrice": 100}]},
        {"id": "CORP-0003", "corporateName": "B Ltd",
         "lineItems": [{"id": 1, "persons": -5, "unitPrice": 100}]}
      ],
      "eventBills": [
        {"id": "EVT-0001", "eventName": "A Event", "totalAmount": 6000,
         "packages": [{"id": 1, "packageName": "Package-1", "persons": 30, "unitPrice": 200}]}
      ]
    }"#;
    let kv = Arc::new(InMemoryKeyValueStore::new());
    kv.set(STORAGE_KEY, raw).unwrap();

    let mut store = BillStore::open(Arc::clone(&kv)).unwrap();
    assert_eq!(store.book().len(), 2);
    store.dispatch(&corporate("50", "200")).unwrap();

    let stored = decode_book(kv.get(STORAGE_KEY).unwrap().as_deref());
    let ids: Vec<_> = stored.bills().iter().map(|b| b.id().to_string()).collect();
    assert_eq!(ids, ["CORP-0001", "CORP-0002", "EVT-0001"]);
    assert_eq!(stored.corporate_bills()[0].corporate_name, "A Ltd");
    assert_eq!(stored.corporate_bills()[1].corporate_name, "X Ltd");
    assert_eq!(kv.get(BACKUP_KEY).unwrap().as_deref(), Some(raw));
}

#[test]
fn clean_blob_is_never_backed_up() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let mut store = BillStore::open(Arc::clone(&kv)).unwrap();
    store.dispatch(&corporate("50", "200")).unwrap();

    let mut reopened = BillStore::open(Arc::clone(&kv)).unwrap();
    reopened.dispatch(&event("30", "200")).unwrap();
    assert_eq!(kv.get(BACKUP_KEY).unwrap(), None);
}
