//! Persisted layout of the bill book.
//!
//! One JSON object under a fixed key:
//! `{"corporateBills": [...], "eventBills": [...]}`. There is no schema
//! version; records are decoded one at a time and whatever decodes is kept.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use cloudkitchen_billing::{BillBook, CorporateBill, EventBill};

/// Storage key the bill book is mirrored under.
pub const STORAGE_KEY: &str = "cloudKitchenBills";

/// Key holding the last blob that could not be fully decoded.
pub const BACKUP_KEY: &str = "cloudKitchenBills-backup";

const CORPORATE_BILLS: &str = "corporateBills";
const EVENT_BILLS: &str = "eventBills";

pub fn encode_book(book: &BillBook) -> Result<String, serde_json::Error> {
    serde_json::to_string(book)
}

/// Result of reading a stored blob.
#[derive(Debug)]
pub struct DecodedBook {
    pub book: BillBook,
    /// Records (or whole categories) that were present but undecodable.
    pub skipped: usize,
}

impl DecodedBook {
    fn empty() -> Self {
        Self {
            book: BillBook::new(),
            skipped: 0,
        }
    }

    /// True when something stored was dropped while decoding.
    pub fn is_lossy(&self) -> bool {
        self.skipped > 0
    }
}

/// Decode a stored blob, keeping every record that decodes.
///
/// An absent key is an empty book. A blob that is not an object counts as one
/// skipped entry; a category that is not an array, or a record that fails to
/// decode, is skipped and logged.
pub fn decode_stored(raw: Option<&str>) -> DecodedBook {
    let Some(raw) = raw else {
        return DecodedBook::empty();
    };

    let mut root = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!(
                key = STORAGE_KEY,
                "stored bills are not an object; starting with an empty book"
            );
            return DecodedBook { skipped: 1, ..DecodedBook::empty() };
        }
        Err(err) => {
            warn!(
                key = STORAGE_KEY,
                error = %err,
                "stored bills could not be parsed; starting with an empty book"
            );
            return DecodedBook { skipped: 1, ..DecodedBook::empty() };
        }
    };

    let mut skipped = 0;
    let corporate: Vec<CorporateBill> =
        decode_category(root.remove(CORPORATE_BILLS), CORPORATE_BILLS, &mut skipped);
    let event: Vec<EventBill> = decode_category(root.remove(EVENT_BILLS), EVENT_BILLS, &mut skipped);

    DecodedBook {
        book: BillBook::from_bills(corporate, event),
        skipped,
    }
}

/// Lenient decode that only keeps the book.
pub fn decode_book(raw: Option<&str>) -> BillBook {
    decode_stored(raw).book
}

fn decode_category<T: DeserializeOwned>(
    value: Option<Value>,
    category: &str,
    skipped: &mut usize,
) -> Vec<T> {
    let records = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(records)) => records,
        Some(_) => {
            warn!(key = STORAGE_KEY, category, "stored category is not a list; skipping it");
            *skipped += 1;
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<T>(record) {
            Ok(bill) => Some(bill),
            Err(err) => {
                warn!(
                    key = STORAGE_KEY,
                    category,
                    index,
                    error = %err,
                    "skipping undecodable stored bill"
                );
                *skipped += 1;
                None
            }
        })
        .collect()
}
