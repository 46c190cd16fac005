//! Storage request intake handlers
//!
//! Requests arrive from the public form as `pending` and are consumed once:
//! approved into a vacant slot, rejected, or deleted.

use shared::command::ApprovalFields;
use shared::models::{RequestStatus, StorageRequest};
use shared::util::prefixed_id;

use super::check_in::{Placement, occupy};
use crate::engine::identity::lookup_customer;
use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
    require_text,
};

/// SubmitStorageRequest action
#[derive(Debug, Clone)]
pub struct SubmitStorageRequestAction {
    pub name: String,
    pub phone: String,
    pub bike_model: String,
    pub duration_months: u32,
    pub notes: Option<String>,
}

impl CommandHandler for SubmitStorageRequestAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        if self.duration_months == 0 {
            return Err(ActionError::Validation(
                "duration must be at least one month".to_string(),
            ));
        }
        let request = StorageRequest {
            id: prefixed_id("REQ"),
            name: require_text("name", &self.name)?,
            phone: require_text("phone", &self.phone)?,
            bike_model: require_text("bike_model", &self.bike_model)?,
            duration_months: self.duration_months,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            timestamp: metadata.now,
            status: RequestStatus::Pending,
        };
        ctx.save_request(&request)?;

        tracing::info!(request_id = %request.id, "Storage request submitted");
        Ok(ActionOutcome::created(request.id))
    }
}

/// ApproveStorageRequest action
///
/// Checks the operator-corrected fields into the target slot under a new
/// session id and marks the request approved, atomically.
#[derive(Debug, Clone)]
pub struct ApproveStorageRequestAction {
    pub request_id: String,
    pub slot_id: String,
    pub fields: ApprovalFields,
}

impl CommandHandler for ApproveStorageRequestAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut request = ctx.load_pending_request(&self.request_id)?;
        let slot = ctx.load_vacant_slot(&self.slot_id)?;

        let fields = &self.fields;
        let name = require_text("name", &fields.name)?;
        let placement = Placement {
            bike_model: fields.bike_model.clone(),
            in_date: fields.start_date,
            expiry_date: fields.end_date,
            notes: fields.notes.clone(),
            photos: fields.photos.clone(),
        };
        placement.validate()?;

        let customer = lookup_customer(ctx, None, &name, fields.phone.trim(), &fields.bike_model)?
            .save(ctx)?;

        let log_notes = format!(
            "Approved from request #{}. {}",
            request.short_ref(),
            fields.notes.trim()
        );
        let session_id = occupy(
            ctx,
            slot,
            &customer,
            &placement,
            Some(log_notes.trim_end().to_string()),
            metadata.now,
        )?;

        request.status = RequestStatus::Approved;
        ctx.save_request(&request)?;

        tracing::info!(
            request_id = %request.id,
            slot_id = %self.slot_id,
            storage_ticket_id = %session_id,
            "Storage request approved"
        );
        Ok(ActionOutcome::created(session_id))
    }
}

/// RejectStorageRequest action
#[derive(Debug, Clone)]
pub struct RejectStorageRequestAction {
    pub request_id: String,
}

impl CommandHandler for RejectStorageRequestAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut request = ctx.load_pending_request(&self.request_id)?;
        request.status = RequestStatus::Rejected;
        ctx.save_request(&request)?;
        tracing::info!(request_id = %request.id, "Storage request rejected");
        Ok(ActionOutcome::default())
    }
}

/// DeleteStorageRequest action - removes the document in any status
#[derive(Debug, Clone)]
pub struct DeleteStorageRequestAction {
    pub request_id: String,
}

impl CommandHandler for DeleteStorageRequestAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        ctx.remove_request(&self.request_id)?;
        Ok(ActionOutcome::default())
    }
}
