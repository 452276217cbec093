use serde::{Deserialize, Serialize};
use tracing::debug;

use cloudkitchen_core::{Aggregate, AggregateRoot, BillId, DomainError, DomainResult, Event};

use crate::bill::{Bill, BillDraft, BillPatch, Billable, BillingType, CorporateBill, EventBill};

static BOOK_ID: &str = "bill-book";

/// Aggregate root: every stored bill, kept per category.
///
/// This is the sole owner of bill records. Persistence snapshots are derived
/// from it by the caller after each successful transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillBook {
    #[serde(default)]
    corporate_bills: Vec<CorporateBill>,
    #[serde(default)]
    event_bills: Vec<EventBill>,
    #[serde(skip)]
    version: u64,
}

impl BillBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a book from already decoded records, keeping their order.
    pub fn from_bills(corporate_bills: Vec<CorporateBill>, event_bills: Vec<EventBill>) -> Self {
        Self {
            corporate_bills,
            event_bills,
            version: 0,
        }
    }

    pub fn corporate_bills(&self) -> &[CorporateBill] {
        &self.corporate_bills
    }

    pub fn event_bills(&self) -> &[EventBill] {
        &self.event_bills
    }

    pub fn len(&self) -> usize {
        self.corporate_bills.len() + self.event_bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All bills, corporate first, each category in insertion order.
    pub fn bills(&self) -> Vec<Bill> {
        self.corporate_bills
            .iter()
            .cloned()
            .map(Bill::Corporate)
            .chain(self.event_bills.iter().cloned().map(Bill::Event))
            .collect()
    }

    pub fn find(&self, id: &BillId) -> Option<Bill> {
        if let Some(b) = self.corporate_bills.iter().find(|b| &b.id == id) {
            return Some(Bill::Corporate(b.clone()));
        }
        self.event_bills
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .map(Bill::Event)
    }

    /// Next id for a category: max minted sequence + 1.
    ///
    /// Ids that don't follow the `<PREFIX>-<digits>` shape are ignored.
    /// Fails once the category's sequence is exhausted.
    pub fn next_id(&self, billing_type: BillingType) -> DomainResult<BillId> {
        let prefix = billing_type.id_prefix();
        let max = match billing_type {
            BillingType::Corporate => max_sequence(&self.corporate_bills, prefix),
            BillingType::Event => max_sequence(&self.event_bills, prefix),
        };
        let next = max.checked_add(1).ok_or_else(|| {
            DomainError::invariant(format!("{billing_type} bill ids are exhausted"))
        })?;
        Ok(BillId::compose(prefix, next))
    }

    fn category_of(&self, id: &BillId) -> Option<BillingType> {
        if self.corporate_bills.iter().any(|b| &b.id == id) {
            Some(BillingType::Corporate)
        } else if self.event_bills.iter().any(|b| &b.id == id) {
            Some(BillingType::Event)
        } else {
            None
        }
    }
}

fn max_sequence<B: Billable>(bills: &[B], prefix: &str) -> u64 {
    bills
        .iter()
        .filter_map(|b| b.id().sequence(prefix))
        .max()
        .unwrap_or(0)
}

impl AggregateRoot for BillBook {
    type Id = &'static str;

    fn id(&self) -> &Self::Id {
        &BOOK_ID
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillCommand {
    /// Submit a new bill; id, totals and words are assigned here.
    AddBill(BillDraft),
    /// Full update: the draft goes through the same pipeline as a new bill.
    ReplaceBill { id: BillId, draft: BillDraft },
    /// Partial header update.
    PatchBill { id: BillId, patch: BillPatch },
    DeleteBill(BillId),
    /// Remove every bill of every category.
    ResetBills,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillEvent {
    BillAdded(Bill),
    BillReplaced(Bill),
    BillPatched { id: BillId, patch: BillPatch },
    BillDeleted { id: BillId, billing_type: BillingType },
    BillsReset,
}

impl Event for BillEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BillEvent::BillAdded(_) => "billing.bill.added",
            BillEvent::BillReplaced(_) => "billing.bill.replaced",
            BillEvent::BillPatched { .. } => "billing.bill.patched",
            BillEvent::BillDeleted { .. } => "billing.bill.deleted",
            BillEvent::BillsReset => "billing.bills.reset",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

impl Aggregate for BillBook {
    type Command = BillCommand;
    type Event = BillEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BillEvent::BillAdded(bill) => match bill {
                Bill::Corporate(b) => self.corporate_bills.push(b.clone()),
                Bill::Event(b) => self.event_bills.push(b.clone()),
            },
            BillEvent::BillReplaced(bill) => match bill {
                Bill::Corporate(b) => {
                    if let Some(slot) = self.corporate_bills.iter_mut().find(|x| x.id == b.id) {
                        *slot = b.clone();
                    }
                }
                Bill::Event(b) => {
                    if let Some(slot) = self.event_bills.iter_mut().find(|x| x.id == b.id) {
                        *slot = b.clone();
                    }
                }
            },
            BillEvent::BillPatched { id, patch } => {
                if let Some(b) = self.corporate_bills.iter_mut().find(|b| &b.id == id) {
                    patch.apply_to(b);
                } else if let Some(b) = self.event_bills.iter_mut().find(|b| &b.id == id) {
                    patch.apply_to(b);
                }
            }
            BillEvent::BillDeleted { id, billing_type } => match billing_type {
                BillingType::Corporate => self.corporate_bills.retain(|b| &b.id != id),
                BillingType::Event => self.event_bills.retain(|b| &b.id != id),
            },
            BillEvent::BillsReset => {
                self.corporate_bills.clear();
                self.event_bills.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
        debug!(
            event = event.event_type(),
            version = self.version,
            bills = self.len(),
            "bill book event applied"
        );
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BillCommand::AddBill(draft) => self.handle_add(draft),
            BillCommand::ReplaceBill { id, draft } => self.handle_replace(id, draft),
            BillCommand::PatchBill { id, patch } => self.handle_patch(id, patch),
            BillCommand::DeleteBill(id) => self.handle_delete(id),
            BillCommand::ResetBills => Ok(vec![BillEvent::BillsReset]),
        }
    }
}

impl BillBook {
    fn ensure_exists(&self, id: &BillId) -> Result<BillingType, DomainError> {
        self.category_of(id)
            .ok_or_else(|| DomainError::not_found(format!("bill {id}")))
    }

    fn handle_add(&self, draft: &BillDraft) -> Result<Vec<BillEvent>, DomainError> {
        let id = self.next_id(draft.billing_type())?;
        let bill = draft.finalize(id)?;
        Ok(vec![BillEvent::BillAdded(bill)])
    }

    fn handle_replace(&self, id: &BillId, draft: &BillDraft) -> Result<Vec<BillEvent>, DomainError> {
        let existing = self.ensure_exists(id)?;
        if existing != draft.billing_type() {
            return Err(DomainError::invariant(format!(
                "bill {id} is a {existing} bill and cannot be replaced by a {} draft",
                draft.billing_type()
            )));
        }
        let bill = draft.finalize(id.clone())?;
        Ok(vec![BillEvent::BillReplaced(bill)])
    }

    fn handle_patch(&self, id: &BillId, patch: &BillPatch) -> Result<Vec<BillEvent>, DomainError> {
        self.ensure_exists(id)?;
        patch.validate()?;
        Ok(vec![BillEvent::BillPatched {
            id: id.clone(),
            patch: patch.clone(),
        }])
    }

    fn handle_delete(&self, id: &BillId) -> Result<Vec<BillEvent>, DomainError> {
        let billing_type = self.ensure_exists(id)?;
        Ok(vec![BillEvent::BillDeleted {
            id: id.clone(),
            billing_type,
        }])
    }
}
