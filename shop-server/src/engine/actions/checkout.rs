//! Checkout command handler
//!
//! Ends a storage session. The log entry keeps the session id and a
//! customer snapshot taken before the occupancy is cleared.

use shared::models::{LogAction, SlotState};

use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
};

/// Checkout action - occupied | on_ride -> vacant
#[derive(Debug, Clone)]
pub struct CheckoutAction {
    pub slot_id: String,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

impl CommandHandler for CheckoutAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut slot = ctx.load_slot(&self.slot_id)?;
        let Some(occupancy) = slot.occupancy().cloned() else {
            return Err(ActionError::SlotNotOccupied(self.slot_id.clone()));
        };

        let log = ctx.log_entry(
            LogAction::Checkout,
            metadata.now,
            &occupancy,
            self.notes.clone(),
            self.photo.clone(),
        )?;
        slot.state = SlotState::Vacant;
        slot.last_activity = metadata.now;
        slot.history.push(log);
        ctx.save_slot(&slot)?;

        tracing::info!(
            slot_id = %slot.id,
            storage_ticket_id = %occupancy.storage_ticket_id,
            "Slot checked out"
        );
        Ok(ActionOutcome::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actions::RideOutAction;
    use crate::engine::traits::test_support::*;
    use shared::models::SlotStatus;

    fn checkout(slot_id: &str) -> CheckoutAction {
        CheckoutAction {
            slot_id: slot_id.into(),
            notes: Some("picked up by owner".into()),
            photo: None,
        }
    }

    #[test]
    fn checkout_clears_occupancy_but_keeps_history() {
        let storage = seeded_storage();
        let session = check_in_alice(&storage, "A-03", jan(1, 9));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);

        checkout("A-03").execute(&mut ctx, &metadata_at(jan(20, 9))).unwrap();
        let slot = ctx.load_slot("A-03").unwrap();

        assert_eq!(slot.status(), SlotStatus::Vacant);
        assert!(slot.occupancy().is_none());
        assert_eq!(slot.history.len(), 2);
        let log = &slot.history[1];
        assert_eq!(log.action, LogAction::Checkout);
        assert_eq!(log.storage_ticket_id.as_deref(), Some(session.as_str()));
        assert_eq!(log.customer_snapshot.as_ref().unwrap().name, "Alice");
        assert_eq!(log.notes.as_deref(), Some("picked up by owner"));
    }

    #[test]
    fn checkout_from_ride_is_allowed() {
        let storage = seeded_storage();
        check_in_alice(&storage, "A-03", jan(1, 9));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);

        RideOutAction {
            slot_id: "A-03".into(),
            notes: None,
            photo: None,
        }
        .execute(&mut ctx, &metadata_at(jan(2, 9)))
        .unwrap();
        checkout("A-03").execute(&mut ctx, &metadata_at(jan(2, 10))).unwrap();
        assert_eq!(ctx.load_slot("A-03").unwrap().status(), SlotStatus::Vacant);
    }

    #[test]
    fn vacant_slot_cannot_check_out() {
        let storage = seeded_storage();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);
        let result = checkout("A-04").execute(&mut ctx, &metadata_at(jan(2, 10)));
        assert!(matches!(result, Err(ActionError::SlotNotOccupied(_))));
        assert!(ctx.load_slot("A-04").unwrap().history.is_empty());
    }
}
