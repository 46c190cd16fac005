//! CheckIn command handler
//!
//! Vacant slot -> occupied, under a freshly minted storage session id.

use chrono::{DateTime, Utc};
use shared::command::CustomerInput;
use shared::models::{Customer, LogAction, Occupancy, SlotState, StorageSlot};
use shared::util::prefixed_id;

use crate::engine::identity::lookup_customer;
use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
    require_text,
};

/// Contract and bike details for a new occupancy
#[derive(Debug, Clone)]
pub struct Placement {
    pub bike_model: String,
    pub in_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub notes: String,
    pub photos: Vec<String>,
}

impl Placement {
    pub fn validate(&self) -> ActionResult<()> {
        require_text("bike_model", &self.bike_model)?;
        if self.expiry_date < self.in_date {
            return Err(ActionError::Validation(
                "expiry date is before the check-in date".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fill a vacant slot and append its check-in entry. Returns the new
/// storage session id.
pub(crate) fn occupy(
    ctx: &mut CommandContext<'_>,
    mut slot: StorageSlot,
    customer: &Customer,
    placement: &Placement,
    log_notes: Option<String>,
    now: DateTime<Utc>,
) -> ActionResult<String> {
    let occupancy = Occupancy {
        customer_id: customer.id.clone(),
        customer_name: customer.name.clone(),
        customer_phone: customer.phone.clone(),
        bike_model: placement.bike_model.trim().to_string(),
        in_date: placement.in_date,
        expiry_date: placement.expiry_date,
        notes: placement.notes.trim().to_string(),
        photos: placement.photos.clone(),
        storage_ticket_id: prefixed_id("ST"),
    };
    let log = ctx.log_entry(LogAction::CheckIn, now, &occupancy, log_notes, None)?;
    let session_id = occupancy.storage_ticket_id.clone();

    slot.state = SlotState::Occupied(occupancy);
    slot.last_activity = now;
    slot.history.push(log);
    ctx.save_slot(&slot)?;

    tracing::info!(
        slot_id = %slot.id,
        storage_ticket_id = %session_id,
        customer_id = %customer.id,
        "Slot checked in"
    );
    Ok(session_id)
}

/// CheckIn action
#[derive(Debug, Clone)]
pub struct CheckInAction {
    pub slot_id: String,
    pub customer: CustomerInput,
    pub placement: Placement,
}

impl CommandHandler for CheckInAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let slot = ctx.load_vacant_slot(&self.slot_id)?;
        let name = require_text("customer name", &self.customer.name)?;
        self.placement.validate()?;

        let customer_id = self
            .customer
            .customer_id
            .as_deref()
            .filter(|id| !id.trim().is_empty());
        let customer = lookup_customer(
            ctx,
            customer_id,
            &name,
            self.customer.phone.trim(),
            &self.placement.bike_model,
        )?
        .save(ctx)?;

        let notes = Some(self.placement.notes.clone());
        let session_id = occupy(ctx, slot, &customer, &self.placement, notes, metadata.now)?;
        Ok(ActionOutcome::created(session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::traits::test_support::*;
    use chrono::TimeZone;
    use shared::models::SlotStatus;
    use shared::snapshot::Collection;

    fn check_in_action(slot_id: &str) -> CheckInAction {
        CheckInAction {
            slot_id: slot_id.into(),
            customer: CustomerInput {
                customer_id: None,
                name: "Alice".into(),
                phone: "0811".into(),
            },
            placement: Placement {
                bike_model: "Brompton".into(),
                in_date: jan(1, 0),
                expiry_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                notes: "front light missing".into(),
                photos: vec!["photo-1".into()],
            },
        }
    }

    #[test]
    fn check_in_fills_every_occupancy_field() {
        let storage = seeded_storage();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);

        let outcome = check_in_action("A-01")
            .execute(&mut ctx, &metadata_at(jan(1, 9)))
            .unwrap();
        let session_id = outcome.resource_id.unwrap();
        let slot = ctx.load_slot("A-01").unwrap();

        assert_eq!(slot.status(), SlotStatus::Occupied);
        let occ = slot.occupancy().unwrap();
        assert_eq!(occ.storage_ticket_id, session_id);
        assert_eq!(occ.customer_name, "Alice");
        assert_eq!(occ.photos, vec!["photo-1"]);
        assert_eq!(slot.last_activity, jan(1, 9));

        assert_eq!(slot.history.len(), 1);
        let log = &slot.history[0];
        assert_eq!(log.action, LogAction::CheckIn);
        assert_eq!(log.storage_ticket_id.as_deref(), Some(session_id.as_str()));
        assert_eq!(log.customer_snapshot.as_ref().unwrap().bike, "Brompton");
        assert_eq!(ctx.touched(), &[Collection::Customers, Collection::Slots]);
    }

    #[test]
    fn occupied_slot_rejects_check_in() {
        let storage = seeded_storage();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);

        check_in_action("A-01")
            .execute(&mut ctx, &metadata_at(jan(1, 9)))
            .unwrap();
        let again = check_in_action("A-01").execute(&mut ctx, &metadata_at(jan(1, 10)));
        assert!(matches!(again, Err(ActionError::SlotNotVacant(_))));
        assert_eq!(ctx.load_slot("A-01").unwrap().history.len(), 1);
    }

    #[test]
    fn inverted_contract_is_rejected() {
        let storage = seeded_storage();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);

        let mut action = check_in_action("A-02");
        action.placement.expiry_date = jan(1, 0) - chrono::Duration::days(1);
        let result = action.execute(&mut ctx, &metadata_at(jan(1, 9)));
        assert!(matches!(result, Err(ActionError::Validation(_))));
        assert!(ctx.touched().is_empty());
    }

    #[test]
    fn unknown_slot_is_reported() {
        let storage = seeded_storage();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);
        let result = check_in_action("B-01").execute(&mut ctx, &metadata_at(jan(1, 9)));
        assert!(matches!(result, Err(ActionError::SlotNotFound(_))));
    }
}
