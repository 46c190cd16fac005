//! ShopManager - command processing and snapshot publishing
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Convert command to action
//!     ├─ 3. Begin write transaction (one atomic unit)
//!     ├─ 4. Double-check idempotency inside the transaction
//!     ├─ 5. Execute action through a CommandContext
//!     ├─ 6. Mark command processed
//!     ├─ 7. Commit
//!     ├─ 8. Publish full snapshots of every touched collection
//!     └─ 9. Return response
//! ```
//!
//! A failed action drops its transaction uncommitted, so nothing is
//! partially applied. Command time is read once the write transaction is
//! open, so timestamps follow commit order. Publishing holds
//! `publish_lock` from snapshot read to send, so the last snapshot a
//! subscriber sees is never older than the last commit. Only ticket creation retries, through the degraded
//! number fallback in [`super::sequence`].

mod error;
pub use error::*;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use shared::command::{CommandResponse, ShopCommand};
use shared::models::{
    Customer, MechanicDefinition, ServiceDefinition, StorageRequest, StorageSlot, Ticket,
};
use shared::snapshot::{Collection, StoreSnapshot};
use tokio::sync::broadcast;

use super::actions::{CommandAction, SlotLayout};
use super::bus::SnapshotBus;
use super::sequence;
use super::storage::ShopStorage;
use super::traits::{ActionError, ActionOutcome, CommandContext, CommandHandler, CommandMetadata};
use crate::core::{Clock, Config, SystemClock};
use crate::reports::{self, StorageKpi, StorageSession, TicketKpi};

/// Engine entry point; cheap to clone, clones share the store and bus
///
/// The `epoch` is generated on each startup so subscribers can detect a
/// restart and resync.
#[derive(Clone)]
pub struct ShopManager {
    storage: ShopStorage,
    bus: SnapshotBus,
    publish_lock: Arc<Mutex<()>>,
    clock: Arc<dyn Clock>,
    tz: Tz,
    layout: SlotLayout,
    epoch: String,
}

impl std::fmt::Debug for ShopManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopManager")
            .field("storage", &"<ShopStorage>")
            .field("bus", &"<SnapshotBus>")
            .field("tz", &self.tz)
            .field("layout", &self.layout)
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl ShopManager {
    /// Open the database under the configured work dir
    pub fn open(config: &Config) -> ManagerResult<Self> {
        let storage = ShopStorage::open(config.db_path())?;
        Self::new(storage, config, Arc::new(SystemClock))
    }

    /// Wrap an existing store, seeding slots and catalog when empty
    pub fn new(storage: ShopStorage, config: &Config, clock: Arc<dyn Clock>) -> ManagerResult<Self> {
        let layout = SlotLayout {
            prefix: config.slot_prefix.clone(),
            count: config.slot_count,
        };
        let seeded = storage.seed_slots(&layout.prefix, layout.count, clock.now())?;
        if seeded > 0 {
            tracing::info!(prefix = %layout.prefix, count = seeded, "Seeded storage slots");
        }
        storage.seed_catalog()?;

        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, tz = %config.timezone, "ShopManager started with new epoch");
        Ok(Self {
            storage,
            bus: SnapshotBus::new(config.snapshot_channel_capacity),
            publish_lock: Arc::new(Mutex::new(())),
            clock,
            tz: config.timezone,
            layout,
            epoch,
        })
    }

    /// Server instance epoch
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn storage(&self) -> &ShopStorage {
        &self.storage
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ========== Commands ==========

    /// Execute a command and publish snapshots of what it changed
    pub fn execute_command(&self, cmd: ShopCommand) -> CommandResponse {
        let command_id = cmd.command_id.clone();
        match self.process_command(&cmd) {
            Ok((response, touched)) => {
                self.publish(&touched);
                response
            }
            Err(err) => {
                tracing::debug!(command_id = %command_id, error = %err, "Command rejected");
                CommandResponse::error(command_id, err.into())
            }
        }
    }

    fn process_command(
        &self,
        cmd: &ShopCommand,
    ) -> ManagerResult<(CommandResponse, Vec<Collection>)> {
        tracing::debug!(
            command_id = %cmd.command_id,
            operator = %cmd.operator_name,
            kind = cmd.payload.kind(),
            "Processing command"
        );

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id.clone()), vec![]));
        }

        let action = CommandAction::build(cmd, &self.layout);

        let (outcome, touched) = match self.run_action(&action, cmd) {
            Ok(Some(done)) => done,
            Ok(None) => return Ok((CommandResponse::duplicate(cmd.command_id.clone()), vec![])),
            Err(err) => match &action {
                CommandAction::CreateTicket(create) if err.is_storage_fault() => {
                    tracing::warn!(
                        command_id = %cmd.command_id,
                        error = %err,
                        "Ticket counter unavailable, falling back to latest ticket number"
                    );
                    let number = sequence::fallback_from_store(&self.storage)?;
                    let retry = CommandAction::CreateTicket(create.with_fixed_number(number));
                    let done = self.run_action(&retry, cmd)?;
                    sequence::repair_counter(&self.storage, number);
                    match done {
                        Some(done) => done,
                        None => {
                            return Ok((
                                CommandResponse::duplicate(cmd.command_id.clone()),
                                vec![],
                            ));
                        }
                    }
                }
                _ => return Err(err.into()),
            },
        };

        Ok((
            CommandResponse::success(cmd.command_id.clone(), outcome.resource_id),
            touched,
        ))
    }

    /// One atomic unit. `Ok(None)` means another writer already applied
    /// this command id.
    fn run_action(
        &self,
        action: &CommandAction,
        cmd: &ShopCommand,
    ) -> Result<Option<(ActionOutcome, Vec<Collection>)>, ActionError> {
        let txn = self.storage.begin_write()?;
        // Stamped under the writer lock
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_name: cmd.operator_name.clone(),
            now: self.clock.now(),
        };

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &metadata.command_id)?
        {
            return Ok(None);
        }

        let mut ctx = CommandContext::new(&txn, &self.storage, self.tz);
        let outcome = action.execute(&mut ctx, &metadata)?;
        let touched = ctx.touched().to_vec();
        drop(ctx);

        self.storage
            .mark_command_processed(&txn, &metadata.command_id)?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        tracing::debug!(
            command_id = %metadata.command_id,
            resource_id = ?outcome.resource_id,
            "Command committed"
        );
        Ok(Some((outcome, touched)))
    }

    // ========== Snapshots ==========

    /// Current full snapshot of one collection
    pub fn snapshot(&self, collection: Collection) -> ManagerResult<StoreSnapshot> {
        Ok(match collection {
            Collection::Tickets => StoreSnapshot::Tickets(self.storage.tickets()?),
            Collection::Customers => StoreSnapshot::Customers(self.storage.customers()?),
            Collection::Slots => StoreSnapshot::Slots(self.storage.slots()?),
            Collection::Requests => StoreSnapshot::Requests(self.storage.pending_requests()?),
            Collection::Mechanics => StoreSnapshot::Mechanics(self.storage.mechanics()?),
            Collection::Services => StoreSnapshot::Services(self.storage.services()?),
        })
    }

    /// Current snapshot plus a receiver for every later one
    ///
    /// The receiver is registered before the read, so no commit falls
    /// between the two.
    pub fn subscribe(
        &self,
        collection: Collection,
    ) -> ManagerResult<(StoreSnapshot, broadcast::Receiver<Arc<StoreSnapshot>>)> {
        let _guard = self.publish_lock.lock();
        let rx = self.bus.subscribe(collection).ok_or_else(|| {
            ManagerError::Internal(format!("No snapshot channel for {}", collection))
        })?;
        Ok((self.snapshot(collection)?, rx))
    }

    fn publish(&self, touched: &[Collection]) {
        if touched.is_empty() {
            return;
        }
        // Read and send as one step so snapshots leave in commit order
        let _guard = self.publish_lock.lock();
        for &collection in touched {
            match self.snapshot(collection) {
                Ok(snapshot) => {
                    let receivers = self.bus.publish(snapshot);
                    if receivers == 0 {
                        tracing::debug!(collection = %collection, "Snapshot published with no receivers");
                    }
                }
                Err(e) => {
                    // Committed already; subscribers catch up on the next change
                    tracing::error!(collection = %collection, error = %e, "Failed to read snapshot for publishing");
                }
            }
        }
    }

    // ========== Queries ==========

    pub fn tickets(&self) -> ManagerResult<Vec<Ticket>> {
        Ok(self.storage.tickets()?)
    }

    pub fn get_ticket(&self, ticket_id: &str) -> ManagerResult<Option<Ticket>> {
        Ok(self
            .storage
            .read_doc(super::storage::TICKETS_TABLE, ticket_id)?)
    }

    pub fn customers(&self) -> ManagerResult<Vec<Customer>> {
        Ok(self.storage.customers()?)
    }

    pub fn slots(&self) -> ManagerResult<Vec<StorageSlot>> {
        Ok(self.storage.slots()?)
    }

    pub fn get_slot(&self, slot_id: &str) -> ManagerResult<Option<StorageSlot>> {
        Ok(self.storage.read_doc(super::storage::SLOTS_TABLE, slot_id)?)
    }

    /// Pending requests, oldest first
    pub fn pending_requests(&self) -> ManagerResult<Vec<StorageRequest>> {
        Ok(self.storage.pending_requests()?)
    }

    pub fn get_request(&self, request_id: &str) -> ManagerResult<Option<StorageRequest>> {
        Ok(self
            .storage
            .read_doc(super::storage::REQUESTS_TABLE, request_id)?)
    }

    pub fn mechanics(&self) -> ManagerResult<Vec<MechanicDefinition>> {
        Ok(self.storage.mechanics()?)
    }

    pub fn services(&self) -> ManagerResult<Vec<ServiceDefinition>> {
        Ok(self.storage.services()?)
    }

    pub fn current_ticket_counter(&self) -> ManagerResult<u64> {
        Ok(self.storage.current_counter()?)
    }

    /// Storage sessions reconstructed from every slot's history
    pub fn sessions(&self) -> ManagerResult<Vec<StorageSession>> {
        let slots = self.storage.slots()?;
        Ok(reports::reconstruct_sessions(&slots, self.clock.now()))
    }

    pub fn ticket_kpi(&self, branch: Option<&str>) -> ManagerResult<TicketKpi> {
        let tickets = self.storage.tickets()?;
        Ok(TicketKpi::compute(&tickets, branch, self.clock.now(), self.tz))
    }

    pub fn storage_kpi(&self) -> ManagerResult<StorageKpi> {
        let slots = self.storage.slots()?;
        Ok(StorageKpi::compute(&slots, self.clock.now()))
    }

    pub fn overdue_slots(&self) -> ManagerResult<Vec<StorageSlot>> {
        let slots = self.storage.slots()?;
        Ok(reports::overdue_slots(&slots, self.clock.now()))
    }
}

#[cfg(test)]
mod tests;
