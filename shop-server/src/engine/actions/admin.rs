//! Destructive admin handlers
//!
//! Irreversible bulk operations, each gated on the operator typing
//! [`CONFIRMATION_PHRASE`].

use shared::snapshot::Collection;

use crate::engine::storage::{REQUESTS_TABLE, SLOTS_TABLE, TICKETS_TABLE};
use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
};

pub const CONFIRMATION_PHRASE: &str = "CONFIRM";

fn confirm(operation: &str, confirmation: &str) -> ActionResult<()> {
    if confirmation.trim() != CONFIRMATION_PHRASE {
        return Err(ActionError::ConfirmationRequired(operation.to_string()));
    }
    Ok(())
}

/// Slot naming used when re-seeding after a wipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    pub prefix: String,
    pub count: u32,
}

/// ResetTicketCounter action
///
/// Existing tickets keep their numbers, so new numbers can repeat old ones.
#[derive(Debug, Clone)]
pub struct ResetTicketCounterAction {
    pub confirmation: String,
}

impl CommandHandler for ResetTicketCounterAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        confirm("reset ticket counter", &self.confirmation)?;
        ctx.storage().write_counter(ctx.txn(), 0)?;
        tracing::info!(operator = %metadata.operator_name, "Ticket counter reset to 0");
        Ok(ActionOutcome::default())
    }
}

/// WipeServiceData action - drops every ticket and customer
#[derive(Debug, Clone)]
pub struct WipeServiceDataAction {
    pub confirmation: String,
}

impl CommandHandler for WipeServiceDataAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        confirm("wipe service data", &self.confirmation)?;
        let storage = ctx.storage();
        storage.clear_table(ctx.txn(), TICKETS_TABLE)?;
        storage.clear_customers(ctx.txn())?;
        ctx.touch(Collection::Tickets);
        ctx.touch(Collection::Customers);
        tracing::warn!(operator = %metadata.operator_name, "Service data wiped");
        Ok(ActionOutcome::default())
    }
}

/// WipeStorageData action - drops every slot and request, then re-seeds
/// vacant slots
#[derive(Debug, Clone)]
pub struct WipeStorageDataAction {
    pub confirmation: String,
    pub layout: SlotLayout,
}

impl CommandHandler for WipeStorageDataAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        confirm("wipe storage data", &self.confirmation)?;
        let storage = ctx.storage();
        storage.clear_table(ctx.txn(), SLOTS_TABLE)?;
        storage.clear_table(ctx.txn(), REQUESTS_TABLE)?;
        let seeded =
            storage.seed_slots_txn(ctx.txn(), &self.layout.prefix, self.layout.count, metadata.now)?;
        ctx.touch(Collection::Slots);
        ctx.touch(Collection::Requests);
        tracing::warn!(
            operator = %metadata.operator_name,
            slots = seeded,
            "Storage data wiped and slots re-seeded"
        );
        Ok(ActionOutcome::default())
    }
}
