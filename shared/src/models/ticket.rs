//! Repair ticket model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket status
///
/// `Waiting -> Active <-> Pending -> Ready -> Done`, with
/// `Waiting | Active -> Cancelled` as an alternate terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Waiting,
    Active,
    Pending,
    Ready,
    Done,
    Cancelled,
}

impl TicketStatus {
    /// Still physically in the shop
    pub fn is_live(self) -> bool {
        matches!(
            self,
            TicketStatus::Waiting | TicketStatus::Active | TicketStatus::Pending | TicketStatus::Ready
        )
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::Active => "active",
            TicketStatus::Pending => "pending",
            TicketStatus::Ready => "ready",
            TicketStatus::Done => "done",
            TicketStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Lifecycle stamps, filled left to right and never regressed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketTimestamps {
    pub arrival: DateTime<Utc>,
    pub called: Option<DateTime<Utc>>,
    pub ready: Option<DateTime<Utc>>,
    pub finished: Option<DateTime<Utc>>,
}

impl TicketTimestamps {
    pub fn arrived_at(arrival: DateTime<Utc>) -> Self {
        Self {
            arrival,
            called: None,
            ready: None,
            finished: None,
        }
    }
}

/// Repair ticket
///
/// Customer fields are denormalized at creation and do not follow later
/// customer edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Globally unique, time-derived id (`T-<snowflake>`)
    pub id: String,
    /// Sequential display number
    pub ticket_number: String,
    pub branch: String,
    pub customer_name: String,
    pub phone: String,
    pub unit_model: String,
    /// Ordered service list, duplicates removed
    pub service_types: Vec<String>,
    pub mechanic: Option<String>,
    pub status: TicketStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub timestamps: TicketTimestamps,
}

/// Dedup a service list keeping first occurrence order
pub fn ordered_services(services: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(services.len());
    for s in services {
        let s = s.trim();
        if !s.is_empty() && !out.iter().any(|o| o == s) {
            out.push(s.to_string());
        }
    }
    out
}
