//! MoveSlot command handler
//!
//! Relocates a stored bike to a vacant slot without ending its session.
//! The only operation that writes two slot documents: the source gets a
//! `checkout` entry, the destination a `check_in` entry, both carrying the
//! original session id and the same customer snapshot.

use shared::models::{LogAction, SlotState};

use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
};

/// MoveSlot action
#[derive(Debug, Clone)]
pub struct MoveSlotAction {
    pub from_slot_id: String,
    pub to_slot_id: String,
}

impl CommandHandler for MoveSlotAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        if self.from_slot_id == self.to_slot_id {
            return Err(ActionError::Validation(
                "source and destination slot are the same".to_string(),
            ));
        }

        // 1. Read both slots before writing either
        let mut source = ctx.load_slot(&self.from_slot_id)?;
        let mut dest = ctx.load_vacant_slot(&self.to_slot_id)?;
        let Some(occupancy) = source.occupancy().cloned() else {
            return Err(ActionError::SlotNotOccupied(self.from_slot_id.clone()));
        };

        // 2. Paired log entries, consecutive sequences
        let now = metadata.now;
        let leave = ctx.log_entry(
            LogAction::Checkout,
            now,
            &occupancy,
            Some(format!("Moved to slot {}", dest.id)),
            None,
        )?;
        let arrive = ctx.log_entry(
            LogAction::CheckIn,
            now,
            &occupancy,
            Some(format!("Moved from slot {}", source.id)),
            None,
        )?;

        // 3. Transfer occupancy verbatim (status included)
        dest.state = std::mem::replace(&mut source.state, SlotState::Vacant);
        dest.last_activity = source.last_activity;
        dest.history.push(arrive);

        source.last_activity = now;
        source.history.push(leave);

        ctx.save_slot(&dest)?;
        ctx.save_slot(&source)?;

        tracing::info!(
            from = %source.id,
            to = %dest.id,
            storage_ticket_id = %occupancy.storage_ticket_id,
            "Storage moved between slots"
        );
        Ok(ActionOutcome::default())
    }
}
