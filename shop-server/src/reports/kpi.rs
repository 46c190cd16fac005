//! Dashboard summaries
//!
//! Live counts describe what is physically in the shop right now and do
//! not reset. Finished and cancelled only count tickets closed on the
//! current business day.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use shared::models::{SlotStatus, StorageSlot, Ticket, TicketStatus};

use crate::utils::time::business_date;

/// Ticket queue summary for one branch and business day
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TicketKpi {
    pub waiting: usize,
    /// Active plus pending
    pub in_progress: usize,
    pub ready: usize,
    pub finished_today: usize,
    pub cancelled_today: usize,
    /// Daily volume: live counts plus today's closures
    pub total: usize,
}

impl TicketKpi {
    /// Summarise tickets, optionally for a single branch
    pub fn compute(tickets: &[Ticket], branch: Option<&str>, now: DateTime<Utc>, tz: Tz) -> Self {
        let today = business_date(now, tz);
        let is_today = |at: DateTime<Utc>| business_date(at, tz) == today;

        let mut kpi = TicketKpi::default();
        for t in tickets
            .iter()
            .filter(|t| branch.is_none_or(|b| t.branch == b))
        {
            match t.status {
                TicketStatus::Waiting => kpi.waiting += 1,
                TicketStatus::Active | TicketStatus::Pending => kpi.in_progress += 1,
                TicketStatus::Ready => kpi.ready += 1,
                TicketStatus::Done => {
                    if t.timestamps.finished.is_some_and(is_today) {
                        kpi.finished_today += 1;
                    }
                }
                TicketStatus::Cancelled => {
                    // Cancellations without a finished stamp fall back to arrival
                    let closed = t.timestamps.finished.unwrap_or(t.timestamps.arrival);
                    if is_today(closed) {
                        kpi.cancelled_today += 1;
                    }
                }
            }
        }
        kpi.total =
            kpi.waiting + kpi.in_progress + kpi.ready + kpi.finished_today + kpi.cancelled_today;
        kpi
    }
}

/// Slot grid summary
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StorageKpi {
    pub vacant: usize,
    pub occupied: usize,
    pub on_ride: usize,
    /// Stored past the contract expiry
    pub overdue: usize,
}

impl StorageKpi {
    pub fn compute(slots: &[StorageSlot], now: DateTime<Utc>) -> Self {
        let mut kpi = StorageKpi::default();
        for slot in slots {
            match slot.status() {
                SlotStatus::Vacant => kpi.vacant += 1,
                SlotStatus::Occupied => kpi.occupied += 1,
                SlotStatus::OnRide => kpi.on_ride += 1,
            }
            if slot.is_overdue(now) {
                kpi.overdue += 1;
            }
        }
        kpi
    }
}

/// Slots whose contract has expired while the bike is still stored
pub fn overdue_slots(slots: &[StorageSlot], now: DateTime<Utc>) -> Vec<StorageSlot> {
    slots.iter().filter(|s| s.is_overdue(now)).cloned().collect()
}
