//! Ticket status and service updates
//!
//! The store does not police status transitions; the desk only offers
//! legal ones. It does apply the transition side effects: timestamp
//! stamping, cancellation reason and the pending-note log.

use shared::models::{TicketStatus, ordered_services};

use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
};
use crate::utils::time::clock_stamp;

/// UpdateTicketStatus action
#[derive(Debug, Clone)]
pub struct UpdateTicketStatusAction {
    pub ticket_id: String,
    pub status: TicketStatus,
    pub mechanic: Option<String>,
    pub note: Option<String>,
    pub reason: Option<String>,
}

impl CommandHandler for UpdateTicketStatusAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut ticket = ctx.load_ticket(&self.ticket_id)?;
        let now = metadata.now;

        let reason = self
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        if self.status == TicketStatus::Cancelled && reason.is_none() {
            return Err(ActionError::Validation(
                "cancellation requires a reason".to_string(),
            ));
        }

        // Stamps fill left to right and are never overwritten
        let stamps = &mut ticket.timestamps;
        match self.status {
            TicketStatus::Active if ticket.status == TicketStatus::Waiting => {
                stamps.called.get_or_insert(now);
            }
            TicketStatus::Ready => {
                stamps.ready.get_or_insert(now);
            }
            TicketStatus::Done | TicketStatus::Cancelled => {
                stamps.finished.get_or_insert(now);
            }
            _ => {}
        }

        if let Some(mechanic) = &self.mechanic {
            let mechanic = mechanic.trim();
            ticket.mechanic = (!mechanic.is_empty()).then(|| mechanic.to_string());
        }
        if let Some(reason) = reason {
            ticket.cancellation_reason = Some(reason.to_string());
        }

        if let Some(note) = &self.note {
            if self.status == TicketStatus::Pending {
                let note = note.trim();
                if !note.is_empty() {
                    let entry = format!("[{}] {}", clock_stamp(now, ctx.tz()), note);
                    ticket.notes = if ticket.notes.trim().is_empty() {
                        entry
                    } else {
                        format!("{} | {}", ticket.notes, entry)
                    };
                }
            } else {
                ticket.notes = note.trim().to_string();
            }
        }

        let from = ticket.status;
        ticket.status = self.status;
        ctx.save_ticket(&ticket)?;

        tracing::debug!(
            ticket_id = %ticket.id,
            ticket_number = %ticket.ticket_number,
            %from,
            to = %ticket.status,
            "Ticket status updated"
        );
        Ok(ActionOutcome::default())
    }
}

/// UpdateTicketServices action
#[derive(Debug, Clone)]
pub struct UpdateTicketServicesAction {
    pub ticket_id: String,
    pub service_types: Vec<String>,
    pub notes: Option<String>,
}

impl CommandHandler for UpdateTicketServicesAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut ticket = ctx.load_ticket(&self.ticket_id)?;
        ticket.service_types = ordered_services(&self.service_types);
        if let Some(notes) = &self.notes {
            ticket.notes = notes.trim().to_string();
        }
        ctx.save_ticket(&ticket)?;
        Ok(ActionOutcome::default())
    }
}
