//! Ticket number allocation
//!
//! The happy path draws from the counter document inside the ticket's own
//! transaction. When that path faults, the manager retries the ticket with
//! a number derived from the latest ticket ([`fallback_number`]) and
//! rewrites the counter best-effort. The fallback can duplicate or skip a
//! number under compound failure; that is accepted.

use shared::models::Ticket;

use super::storage::{ShopStorage, StorageResult};
use super::traits::{ActionResult, CommandContext};

/// Where a ticket's display number comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberSource {
    /// Increment the counter inside the current transaction
    Counter,
    /// Pre-computed by the degraded fallback
    Fixed(u64),
}

/// Read phase: the number the next ticket will carry
pub fn peek_next(ctx: &CommandContext<'_>, source: NumberSource) -> ActionResult<u64> {
    match source {
        NumberSource::Counter => Ok(ctx.storage().read_counter(ctx.txn())? + 1),
        NumberSource::Fixed(n) => Ok(n),
    }
}

/// Write phase: advance the counter to a number drawn by [`peek_next`].
/// Fixed numbers leave the counter to [`repair_counter`].
pub fn claim(ctx: &CommandContext<'_>, source: NumberSource, number: u64) -> ActionResult<()> {
    if source == NumberSource::Counter {
        ctx.storage().write_counter(ctx.txn(), number)?;
    }
    Ok(())
}

/// Latest ticket's display number plus one (1 when absent or unparsable)
pub fn fallback_number(latest: Option<&Ticket>) -> u64 {
    latest
        .and_then(|t| t.ticket_number.trim().parse::<u64>().ok())
        .map(|n| n + 1)
        .unwrap_or(1)
}

/// Degraded path: compute the number outside the failed transaction
pub fn fallback_from_store(storage: &ShopStorage) -> StorageResult<u64> {
    let latest = storage.latest_ticket()?;
    Ok(fallback_number(latest.as_ref()))
}

/// Rewrite the counter to match a fallback number, logging on failure
pub fn repair_counter(storage: &ShopStorage, value: u64) {
    match storage.set_counter(value) {
        Ok(()) => tracing::info!(ticket_counter = value, "Ticket counter realigned"),
        Err(e) => tracing::warn!(
            ticket_counter = value,
            error = %e,
            "Best-effort ticket counter rewrite failed"
        ),
    }
}
