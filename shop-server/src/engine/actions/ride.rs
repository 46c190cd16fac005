//! RideOut / RideReturn command handlers
//!
//! A stored bike taken out for a ride keeps its slot and session.

use shared::models::{LogAction, SlotState};

use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
};

/// RideOut action - occupied -> on_ride
#[derive(Debug, Clone)]
pub struct RideOutAction {
    pub slot_id: String,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

impl CommandHandler for RideOutAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut slot = ctx.load_slot(&self.slot_id)?;
        let occupancy = match &slot.state {
            SlotState::Occupied(o) => o.clone(),
            _ => return Err(ActionError::SlotNotOccupied(self.slot_id.clone())),
        };

        let log = ctx.log_entry(
            LogAction::RideOut,
            metadata.now,
            &occupancy,
            self.notes.clone(),
            self.photo.clone(),
        )?;
        slot.state = SlotState::OnRide(occupancy);
        slot.last_activity = metadata.now;
        slot.history.push(log);
        ctx.save_slot(&slot)?;

        tracing::debug!(slot_id = %slot.id, "Bike out for a ride");
        Ok(ActionOutcome::default())
    }
}

/// RideReturn action - on_ride -> occupied
#[derive(Debug, Clone)]
pub struct RideReturnAction {
    pub slot_id: String,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

impl CommandHandler for RideReturnAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut slot = ctx.load_slot(&self.slot_id)?;
        let occupancy = match &slot.state {
            SlotState::OnRide(o) => o.clone(),
            _ => return Err(ActionError::SlotNotOnRide(self.slot_id.clone())),
        };

        let log = ctx.log_entry(
            LogAction::RideReturn,
            metadata.now,
            &occupancy,
            self.notes.clone(),
            self.photo.clone(),
        )?;
        slot.state = SlotState::Occupied(occupancy);
        slot.last_activity = metadata.now;
        slot.history.push(log);
        ctx.save_slot(&slot)?;

        tracing::debug!(slot_id = %slot.id, "Bike back from a ride");
        Ok(ActionOutcome::default())
    }
}
