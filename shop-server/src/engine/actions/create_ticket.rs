//! CreateTicket command handler
//!
//! Reads the counter and the matching customer, then writes the counter,
//! the customer upsert and the ticket, all in one transaction.

use shared::models::{Ticket, TicketStatus, TicketTimestamps, ordered_services};
use shared::util::prefixed_id;

use crate::engine::identity::lookup_customer;
use crate::engine::sequence::{self, NumberSource};
use crate::engine::traits::{
    ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata, require_text,
};

/// CreateTicket action
#[derive(Debug, Clone)]
pub struct CreateTicketAction {
    pub branch: String,
    pub customer_name: String,
    pub phone: String,
    pub unit_model: String,
    pub service_types: Vec<String>,
    pub notes: String,
    pub customer_id: Option<String>,
    pub number: NumberSource,
}

impl CreateTicketAction {
    /// Same ticket, numbered by the degraded fallback
    pub fn with_fixed_number(&self, number: u64) -> Self {
        Self {
            number: NumberSource::Fixed(number),
            ..self.clone()
        }
    }
}

impl CommandHandler for CreateTicketAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let branch = require_text("branch", &self.branch)?;
        let name = require_text("customer_name", &self.customer_name)?;
        let unit = require_text("unit_model", &self.unit_model)?;
        let phone = self.phone.trim().to_string();

        // Reads
        let number = sequence::peek_next(ctx, self.number)?;
        let customer_id = self.customer_id.as_deref().filter(|id| !id.trim().is_empty());
        let customer = lookup_customer(ctx, customer_id, &name, &phone, &unit)?;

        // Writes
        sequence::claim(ctx, self.number, number)?;
        customer.save(ctx)?;

        let ticket = Ticket {
            id: prefixed_id("T"),
            ticket_number: number.to_string(),
            branch,
            customer_name: name,
            phone,
            unit_model: unit,
            service_types: ordered_services(&self.service_types),
            mechanic: None,
            status: TicketStatus::Waiting,
            notes: self.notes.trim().to_string(),
            cancellation_reason: None,
            timestamps: TicketTimestamps::arrived_at(metadata.now),
        };
        ctx.save_ticket(&ticket)?;

        tracing::info!(
            ticket_id = %ticket.id,
            ticket_number = %ticket.ticket_number,
            branch = %ticket.branch,
            "Ticket created"
        );
        Ok(ActionOutcome::created(ticket.id))
    }
}
