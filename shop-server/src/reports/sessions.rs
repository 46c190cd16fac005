//! Storage session reconstruction
//!
//! A session is every history entry sharing one `storage_ticket_id`,
//! across however many slots the bike was moved through. Sessions are
//! rebuilt from scratch on every call; nothing here is stored.
//!
//! Entries are merged branch-wide and ordered by
//! `(timestamp, sequence, slot_id, history index)`, so the result does not
//! depend on the order slots are handed in. A move writes its `checkout`
//! and `check_in` with one timestamp; the sequence keeps the `check_in`
//! last, so a moved session still reads as active.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::models::{LogAction, StorageLog, StorageSlot};

use crate::utils::time::whole_days;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// One history entry with the slot it was written to
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionEntry {
    pub slot_id: String,
    #[serde(flatten)]
    pub log: StorageLog,
}

/// Reconstructed storage session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StorageSession {
    /// Session id, or a synthetic `LEGACY-` key for entries without one
    pub storage_ticket_id: String,
    pub legacy: bool,
    /// Slot of the most recent entry
    pub current_slot: String,
    pub customer_name: String,
    pub bike_model: String,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub duration_days: i64,
    /// Slots in the order the session visited them
    pub slots: Vec<String>,
    pub entries: Vec<SessionEntry>,
}

impl StorageSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

struct FlatEntry<'a> {
    slot_id: &'a str,
    index: usize,
    log: &'a StorageLog,
}

/// Rebuild every session from the given slots' histories
///
/// Sessions come out in the order of their first entry.
pub fn reconstruct_sessions(slots: &[StorageSlot], now: DateTime<Utc>) -> Vec<StorageSession> {
    let mut flat: Vec<FlatEntry<'_>> = slots
        .iter()
        .flat_map(|slot| {
            slot.history.iter().enumerate().map(move |(index, log)| FlatEntry {
                slot_id: slot.id.as_str(),
                index,
                log,
            })
        })
        .collect();

    flat.sort_by(|a, b| {
        a.log
            .timestamp
            .cmp(&b.log.timestamp)
            .then(a.log.sequence.cmp(&b.log.sequence))
            .then_with(|| a.slot_id.cmp(b.slot_id))
            .then(a.index.cmp(&b.index))
    });

    let mut order: Vec<(String, bool)> = Vec::new();
    let mut groups: HashMap<String, Vec<&FlatEntry<'_>>> = HashMap::new();
    for entry in &flat {
        let (key, legacy) = match &entry.log.storage_ticket_id {
            Some(id) if !id.is_empty() => (id.clone(), false),
            _ => (format!("LEGACY-{}-{}", entry.slot_id, entry.index), true),
        };
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push((key, legacy));
            Vec::new()
        });
        group.push(entry);
    }

    order
        .into_iter()
        .filter_map(|(key, legacy)| {
            let entries = groups.remove(&key)?;
            build_session(key, legacy, &entries, slots, now)
        })
        .collect()
}

fn build_session(
    key: String,
    legacy: bool,
    entries: &[&FlatEntry<'_>],
    slots: &[StorageSlot],
    now: DateTime<Utc>,
) -> Option<StorageSession> {
    let first = entries.first()?;
    let last = entries.last()?;

    let check_in_date = entries
        .iter()
        .find(|e| e.log.action == LogAction::CheckIn)
        .unwrap_or(first)
        .log
        .timestamp;

    let (status, check_out_date) = if last.log.action == LogAction::Checkout {
        (SessionStatus::Completed, Some(last.log.timestamp))
    } else {
        (SessionStatus::Active, None)
    };

    let live = (status == SessionStatus::Active)
        .then(|| {
            slots
                .iter()
                .find(|s| s.id == last.slot_id && s.storage_ticket_id() == Some(key.as_str()))
                .and_then(|s| s.occupancy())
        })
        .flatten();
    let (customer_name, bike_model) = match live {
        Some(occ) => (occ.customer_name.clone(), occ.bike_model.clone()),
        None => entries
            .iter()
            .rev()
            .find_map(|e| e.log.customer_snapshot.as_ref())
            .map(|s| (s.name.clone(), s.bike.clone()))
            .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string())),
    };

    let mut visited: Vec<String> = Vec::new();
    for e in entries {
        if visited.last().map(String::as_str) != Some(e.slot_id) {
            visited.push(e.slot_id.to_string());
        }
    }

    Some(StorageSession {
        storage_ticket_id: key,
        legacy,
        current_slot: last.slot_id.to_string(),
        customer_name,
        bike_model,
        check_in_date,
        check_out_date,
        status,
        duration_days: whole_days(check_in_date, check_out_date.unwrap_or(now)),
        slots: visited,
        entries: entries
            .iter()
            .map(|e| SessionEntry {
                slot_id: e.slot_id.to_string(),
                log: e.log.clone(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::models::{CustomerSnapshot, Occupancy, SlotState};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn log(seq: u64, action: LogAction, ts: DateTime<Utc>, session: Option<&str>) -> StorageLog {
        StorageLog {
            id: format!("LOG-{}", seq),
            sequence: seq,
            action,
            timestamp: ts,
            notes: None,
            photo: None,
            storage_ticket_id: session.map(str::to_string),
            customer_snapshot: Some(CustomerSnapshot {
                name: "Alice".into(),
                bike: "Brompton".into(),
            }),
        }
    }

    fn slot(id: &str, history: Vec<StorageLog>) -> StorageSlot {
        let mut slot = StorageSlot::vacant(id, at(1, 0));
        slot.history = history;
        slot
    }

    fn occupied(mut slot: StorageSlot, session: &str, name: &str) -> StorageSlot {
        slot.state = SlotState::Occupied(Occupancy {
            customer_id: "CUST-1".into(),
            customer_name: name.into(),
            customer_phone: "0811".into(),
            bike_model: "Brompton".into(),
            in_date: at(1, 0),
            expiry_date: at(31, 0),
            notes: String::new(),
            photos: vec![],
            storage_ticket_id: session.into(),
        });
        slot
    }

    #[test]
    fn moved_session_is_active_in_new_slot() {
        // Same timestamp on the move pair; sequence decides
        let a01 = slot(
            "A-01",
            vec![
                log(1, LogAction::CheckIn, at(1, 9), Some("ST-1")),
                log(2, LogAction::Checkout, at(5, 9), Some("ST-1")),
            ],
        );
        let a02 = occupied(
            slot("A-02", vec![log(3, LogAction::CheckIn, at(5, 9), Some("ST-1"))]),
            "ST-1",
            "Alice Wong",
        );

        let sessions = reconstruct_sessions(&[a02.clone(), a01.clone()], at(11, 9));
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.status, SessionStatus::Active);
        assert_eq!(s.current_slot, "A-02");
        assert_eq!(s.check_in_date, at(1, 9));
        assert_eq!(s.check_out_date, None);
        assert_eq!(s.duration_days, 10);
        assert_eq!(s.slots, vec!["A-01", "A-02"]);
        // Live slot wins for display while active
        assert_eq!(s.customer_name, "Alice Wong");

        assert_eq!(sessions, reconstruct_sessions(&[a01, a02], at(11, 9)));
    }

    #[test]
    fn checkout_last_completes_session() {
        let a01 = slot(
            "A-01",
            vec![
                log(1, LogAction::CheckIn, at(1, 9), Some("ST-1")),
                log(2, LogAction::RideOut, at(2, 9), Some("ST-1")),
                log(3, LogAction::RideReturn, at(2, 18), Some("ST-1")),
                log(4, LogAction::Checkout, at(4, 12), Some("ST-1")),
            ],
        );
        let sessions = reconstruct_sessions(&[a01], at(20, 0));
        let s = &sessions[0];
        assert_eq!(s.status, SessionStatus::Completed);
        assert_eq!(s.check_out_date, Some(at(4, 12)));
        assert_eq!(s.duration_days, 3);
        assert_eq!(s.customer_name, "Alice");
    }

    #[test]
    fn legacy_entries_become_single_entry_sessions() {
        let a01 = slot(
            "A-01",
            vec![
                log(0, LogAction::CheckIn, at(1, 9), None),
                log(0, LogAction::Checkout, at(3, 9), None),
            ],
        );
        let sessions = reconstruct_sessions(&[a01], at(20, 0));
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| s.legacy && s.entries.len() == 1));
        assert_eq!(sessions[0].status, SessionStatus::Active);
        assert_eq!(sessions[1].status, SessionStatus::Completed);
        assert_ne!(sessions[0].storage_ticket_id, sessions[1].storage_ticket_id);
    }

    #[test]
    fn first_entry_stands_in_when_no_check_in() {
        let a01 = slot("A-01", vec![log(7, LogAction::Extend, at(6, 9), Some("ST-9"))]);
        let sessions = reconstruct_sessions(&[a01], at(8, 9));
        assert_eq!(sessions[0].check_in_date, at(6, 9));
        assert_eq!(sessions[0].duration_days, 2);
        // Slot is vacant, so display comes from the snapshot
        assert_eq!(sessions[0].bike_model, "Brompton");
    }

    #[test]
    fn sessions_are_ordered_by_first_entry() {
        let a01 = slot("A-01", vec![log(2, LogAction::CheckIn, at(3, 9), Some("ST-B"))]);
        let a02 = slot("A-02", vec![log(1, LogAction::CheckIn, at(2, 9), Some("ST-A"))]);
        let sessions = reconstruct_sessions(&[a01, a02], at(4, 9));
        let ids: Vec<_> = sessions.iter().map(|s| s.storage_ticket_id.as_str()).collect();
        assert_eq!(ids, vec!["ST-A", "ST-B"]);
    }
}
