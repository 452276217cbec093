use thiserror::Error;
use tracing::{debug, info, warn};

use cloudkitchen_billing::{BillBook, BillCommand, BillEvent};
use cloudkitchen_core::{Aggregate, AggregateRoot, DomainError, Event};

use crate::kv::{KeyValueStore, StorageError};
use crate::layout::{BACKUP_KEY, STORAGE_KEY, decode_stored, encode_book};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode bills: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Bill book plus its persistence mirror.
///
/// `dispatch` runs the pure transition first, then writes a snapshot through
/// the injected port. A failed write is returned to the caller; the in-memory
/// transition stays applied and the next successful write catches up.
///
/// If the stored blob lost records while loading, it is copied under
/// `BACKUP_KEY` before the first write replaces it.
#[derive(Debug)]
pub struct BillStore<S> {
    book: BillBook,
    storage: S,
    unsaved_backup: Option<String>,
}

impl<S: KeyValueStore> BillStore<S> {
    /// Load the book from `storage` (absent key means empty).
    pub fn open(storage: S) -> Result<Self, StoreError> {
        let raw = storage.get(STORAGE_KEY)?;
        let decoded = decode_stored(raw.as_deref());
        debug!(
            bills = decoded.book.len(),
            skipped = decoded.skipped,
            "bill book loaded"
        );
        let unsaved_backup = if decoded.is_lossy() { raw } else { None };
        Ok(Self {
            book: decoded.book,
            storage,
            unsaved_backup,
        })
    }

    pub fn book(&self) -> &BillBook {
        &self.book
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn dispatch(&mut self, command: &BillCommand) -> Result<Vec<BillEvent>, StoreError> {
        let events = self.book.execute(command)?;
        for event in &events {
            log_event(event);
        }
        self.mirror(command)?;
        Ok(events)
    }

    fn mirror(&mut self, command: &BillCommand) -> Result<(), StoreError> {
        if let Some(raw) = &self.unsaved_backup {
            self.storage.set(BACKUP_KEY, raw)?;
            warn!(key = BACKUP_KEY, "undecodable stored bills backed up before overwrite");
            self.unsaved_backup = None;
        }
        if matches!(command, BillCommand::ResetBills) {
            self.storage.remove(STORAGE_KEY)?;
        } else {
            let blob = encode_book(&self.book)?;
            self.storage.set(STORAGE_KEY, &blob)?;
        }
        debug!(version = self.book.version(), "bill book mirrored");
        Ok(())
    }

    pub fn into_parts(self) -> (BillBook, S) {
        (self.book, self.storage)
    }
}

fn log_event(event: &BillEvent) {
    match event {
        BillEvent::BillAdded(bill) | BillEvent::BillReplaced(bill) => info!(
            event = event.event_type(),
            bill_id = %bill.id(),
            total_amount = bill.total_amount(),
            "bill stored"
        ),
        BillEvent::BillPatched { id, .. } | BillEvent::BillDeleted { id, .. } => {
            info!(event = event.event_type(), bill_id = %id, "bill changed")
        }
        BillEvent::BillsReset => info!(event = event.event_type(), "all bills removed"),
    }
}
