//! Read-only projections over collection snapshots
//!
//! Recomputed in full on every call; collections are small.

pub mod kpi;
pub mod sessions;

pub use kpi::{StorageKpi, TicketKpi, overdue_slots};
pub use sessions::{SessionEntry, SessionStatus, StorageSession, reconstruct_sessions};
