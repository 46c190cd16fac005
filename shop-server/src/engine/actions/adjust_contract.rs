//! AdjustContract command handler

use chrono::{DateTime, Utc};
use shared::models::{LogAction, SlotState};

use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
};

/// AdjustContract action - rewrites the contract dates of an occupied slot
#[derive(Debug, Clone)]
pub struct AdjustContractAction {
    pub slot_id: String,
    pub in_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

impl CommandHandler for AdjustContractAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut slot = ctx.load_slot(&self.slot_id)?;
        let SlotState::Occupied(mut occupancy) = slot.state.clone() else {
            return Err(ActionError::SlotNotOccupied(self.slot_id.clone()));
        };
        if self.expiry_date < self.in_date {
            return Err(ActionError::Validation(
                "expiry date is before the check-in date".to_string(),
            ));
        }

        let tz = ctx.tz();
        let notes = format!(
            "Contract adjusted. Start: {}, End: {}",
            self.in_date.with_timezone(&tz).format("%Y-%m-%d"),
            self.expiry_date.with_timezone(&tz).format("%Y-%m-%d"),
        );
        // Snapshot before the rewrite
        let log = ctx.log_entry(LogAction::Extend, metadata.now, &occupancy, Some(notes), None)?;

        occupancy.in_date = self.in_date;
        occupancy.expiry_date = self.expiry_date;
        slot.state = SlotState::Occupied(occupancy);
        slot.history.push(log);
        ctx.save_slot(&slot)?;

        tracing::info!(
            slot_id = %slot.id,
            expiry_date = %self.expiry_date,
            "Storage contract adjusted"
        );
        Ok(ActionOutcome::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actions::RideOutAction;
    use crate::engine::traits::test_support::*;
    use chrono::TimeZone;

    fn adjust(slot_id: &str) -> AdjustContractAction {
        AdjustContractAction {
            slot_id: slot_id.into(),
            in_date: jan(1, 0),
            expiry_date: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn extend_rewrites_dates_and_logs() {
        let storage = seeded_storage();
        let session = check_in_alice(&storage, "A-01", jan(1, 9));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);

        adjust("A-01").execute(&mut ctx, &metadata_at(jan(25, 9))).unwrap();
        let slot = ctx.load_slot("A-01").unwrap();
        let occ = slot.occupancy().unwrap();
        assert_eq!(occ.expiry_date, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        assert_eq!(occ.storage_ticket_id, session);

        let log = slot.history.last().unwrap();
        assert_eq!(log.action, LogAction::Extend);
        assert_eq!(
            log.notes.as_deref(),
            Some("Contract adjusted. Start: 2024-01-01, End: 2024-04-01")
        );
        assert!(!slot.is_overdue(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn on_ride_and_vacant_slots_cannot_adjust() {
        let storage = seeded_storage();
        check_in_alice(&storage, "A-01", jan(1, 9));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);
        let meta = metadata_at(jan(2, 9));

        assert!(matches!(
            adjust("A-02").execute(&mut ctx, &meta),
            Err(ActionError::SlotNotOccupied(_))
        ));
        RideOutAction {
            slot_id: "A-01".into(),
            notes: None,
            photo: None,
        }
        .execute(&mut ctx, &meta)
        .unwrap();
        assert!(matches!(
            adjust("A-01").execute(&mut ctx, &meta),
            Err(ActionError::SlotNotOccupied(_))
        ));
    }
}
