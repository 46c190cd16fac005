//! Command handling seam
//!
//! Every action runs inside one redb write transaction through a
//! [`CommandContext`]. Actions do all of their reads before their first
//! write and return an [`ActionOutcome`]; the manager commits.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use redb::WriteTransaction;
use shared::models::{
    CustomerSnapshot, LogAction, Occupancy, RequestStatus, StorageLog, StorageRequest,
    StorageSlot, Ticket,
};
use shared::snapshot::Collection;
use thiserror::Error;

use super::storage::{REQUESTS_TABLE, SLOTS_TABLE, ShopStorage, StorageError, TICKETS_TABLE};

/// Failures raised inside an atomic unit. Any of these aborts the unit.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    #[error("Slot {0} is not vacant")]
    SlotNotVacant(String),

    #[error("Slot {0} is not occupied")]
    SlotNotOccupied(String),

    #[error("Slot {0} is not on a ride")]
    SlotNotOnRide(String),

    #[error("Storage request not found: {0}")]
    RequestNotFound(String),

    #[error("Storage request {0} is not pending")]
    RequestNotPending(String),

    #[error("Catalog entry not found: {0}")]
    CatalogEntryNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} requires typing CONFIRM")]
    ConfirmationRequired(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ActionError {
    /// Faults of the store itself, as opposed to rejected preconditions
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, ActionError::Storage(_))
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Command metadata passed to every action
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_name: String,
    /// Server time for this command
    pub now: DateTime<Utc>,
}

/// What an action produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Id of the document the action created, if any
    pub resource_id: Option<String>,
}

impl ActionOutcome {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(id.into()),
        }
    }
}

/// Per-command view over the open write transaction
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a ShopStorage,
    tz: Tz,
    touched: Vec<Collection>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a ShopStorage, tz: Tz) -> Self {
        Self {
            txn,
            storage,
            tz,
            touched: Vec::new(),
        }
    }

    pub fn txn(&self) -> &'a WriteTransaction {
        self.txn
    }

    pub fn storage(&self) -> &'a ShopStorage {
        self.storage
    }

    /// Business timezone
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Record that a collection changed, so its snapshot is republished
    pub fn touch(&mut self, collection: Collection) {
        if !self.touched.contains(&collection) {
            self.touched.push(collection);
        }
    }

    pub fn touched(&self) -> &[Collection] {
        &self.touched
    }

    // ========== Tickets ==========

    pub fn load_ticket(&self, ticket_id: &str) -> ActionResult<Ticket> {
        self.storage
            .get_doc(self.txn, TICKETS_TABLE, ticket_id)?
            .ok_or_else(|| ActionError::TicketNotFound(ticket_id.to_string()))
    }

    pub fn save_ticket(&mut self, ticket: &Ticket) -> ActionResult<()> {
        self.storage
            .put_doc(self.txn, TICKETS_TABLE, &ticket.id, ticket)?;
        self.touch(Collection::Tickets);
        Ok(())
    }

    // ========== Slots ==========

    pub fn load_slot(&self, slot_id: &str) -> ActionResult<StorageSlot> {
        self.storage
            .get_doc(self.txn, SLOTS_TABLE, slot_id)?
            .ok_or_else(|| ActionError::SlotNotFound(slot_id.to_string()))
    }

    /// Load a slot and require it to be vacant
    pub fn load_vacant_slot(&self, slot_id: &str) -> ActionResult<StorageSlot> {
        let slot = self.load_slot(slot_id)?;
        if slot.occupancy().is_some() {
            return Err(ActionError::SlotNotVacant(slot_id.to_string()));
        }
        Ok(slot)
    }

    pub fn save_slot(&mut self, slot: &StorageSlot) -> ActionResult<()> {
        self.storage.put_doc(self.txn, SLOTS_TABLE, &slot.id, slot)?;
        self.touch(Collection::Slots);
        Ok(())
    }

    /// Build a history entry bound to an occupancy, taking the next global
    /// log sequence
    pub fn log_entry(
        &self,
        action: LogAction,
        at: DateTime<Utc>,
        occupancy: &Occupancy,
        notes: Option<String>,
        photo: Option<String>,
    ) -> ActionResult<StorageLog> {
        self.log_entry_with(
            action,
            at,
            Some(occupancy.storage_ticket_id.clone()),
            Some(occupancy.snapshot()),
            notes,
            photo,
        )
    }

    pub fn log_entry_with(
        &self,
        action: LogAction,
        at: DateTime<Utc>,
        storage_ticket_id: Option<String>,
        customer_snapshot: Option<CustomerSnapshot>,
        notes: Option<String>,
        photo: Option<String>,
    ) -> ActionResult<StorageLog> {
        let sequence = self.storage.next_log_sequence(self.txn)?;
        Ok(StorageLog {
            id: format!("LOG-{}", sequence),
            sequence,
            action,
            timestamp: at,
            notes: notes.filter(|n| !n.trim().is_empty()),
            photo: photo.filter(|p| !p.trim().is_empty()),
            storage_ticket_id,
            customer_snapshot,
        })
    }

    // ========== Requests ==========

    pub fn load_request(&self, request_id: &str) -> ActionResult<StorageRequest> {
        self.storage
            .get_doc(self.txn, REQUESTS_TABLE, request_id)?
            .ok_or_else(|| ActionError::RequestNotFound(request_id.to_string()))
    }

    /// Load a request and require it to still be pending
    pub fn load_pending_request(&self, request_id: &str) -> ActionResult<StorageRequest> {
        let request = self.load_request(request_id)?;
        if request.status != RequestStatus::Pending {
            return Err(ActionError::RequestNotPending(request_id.to_string()));
        }
        Ok(request)
    }

    pub fn save_request(&mut self, request: &StorageRequest) -> ActionResult<()> {
        self.storage
            .put_doc(self.txn, REQUESTS_TABLE, &request.id, request)?;
        self.touch(Collection::Requests);
        Ok(())
    }

    pub fn remove_request(&mut self, request_id: &str) -> ActionResult<()> {
        if !self.storage.remove_doc(self.txn, REQUESTS_TABLE, request_id)? {
            return Err(ActionError::RequestNotFound(request_id.to_string()));
        }
        self.touch(Collection::Requests);
        Ok(())
    }
}

/// Command handler trait
///
/// Handlers validate against the current documents and write the new
/// state through the context. Returning an error drops the transaction.
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome>;
}

/// Reject blank required text fields
pub fn require_text(field: &str, value: &str) -> ActionResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ActionError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
