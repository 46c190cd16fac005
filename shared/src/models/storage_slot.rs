//! Storage slot model
//!
//! A slot is one fixed physical bay. Its occupancy lives inside the
//! [`SlotState`] variant, so a slot is either fully vacant or fully
//! occupied; there is no half-filled representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flat status as shown on the slot grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Vacant,
    Occupied,
    OnRide,
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SlotStatus::Vacant => "vacant",
            SlotStatus::Occupied => "occupied",
            SlotStatus::OnRide => "on_ride",
        };
        f.write_str(s)
    }
}

/// Occupancy fields, present together or not at all
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occupancy {
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub bike_model: String,
    pub in_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub photos: Vec<String>,
    /// Storage session id (`ST-...`), survives moves between slots
    pub storage_ticket_id: String,
}

impl Occupancy {
    pub fn snapshot(&self) -> CustomerSnapshot {
        CustomerSnapshot {
            name: self.customer_name.clone(),
            bike: self.bike_model.clone(),
        }
    }
}

/// Slot state machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotState {
    Vacant,
    Occupied(Occupancy),
    OnRide(Occupancy),
}

/// Frozen customer copy carried by each log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerSnapshot {
    pub name: String,
    pub bike: String,
}

/// Audit action recorded in a slot history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    CheckIn,
    RideOut,
    RideReturn,
    Checkout,
    Extend,
}

/// One append-only history entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageLog {
    pub id: String,
    /// Store-assigned global log sequence; 0 on legacy entries
    #[serde(default)]
    pub sequence: u64,
    pub action: LogAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_ticket_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_snapshot: Option<CustomerSnapshot>,
}

/// Storage slot document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageSlot {
    /// Stable key, e.g. `A-01`
    pub id: String,
    #[serde(flatten)]
    pub state: SlotState,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<StorageLog>,
}

impl StorageSlot {
    pub fn vacant(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            state: SlotState::Vacant,
            last_activity: now,
            history: Vec::new(),
        }
    }

    pub fn status(&self) -> SlotStatus {
        match self.state {
            SlotState::Vacant => SlotStatus::Vacant,
            SlotState::Occupied(_) => SlotStatus::Occupied,
            SlotState::OnRide(_) => SlotStatus::OnRide,
        }
    }

    pub fn occupancy(&self) -> Option<&Occupancy> {
        match &self.state {
            SlotState::Vacant => None,
            SlotState::Occupied(o) | SlotState::OnRide(o) => Some(o),
        }
    }

    pub fn storage_ticket_id(&self) -> Option<&str> {
        self.occupancy().map(|o| o.storage_ticket_id.as_str())
    }

    /// Contract expired while the bike is still stored
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.occupancy().is_some_and(|o| o.expiry_date < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn occupancy() -> Occupancy {
        Occupancy {
            customer_id: "CUST-1".into(),
            customer_name: "Alice".into(),
            customer_phone: "0812".into(),
            bike_model: "Brompton".into(),
            in_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            expiry_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            notes: String::new(),
            photos: vec![],
            storage_ticket_id: "ST-1".into(),
        }
    }

    #[test]
    fn vacant_slot_serializes_without_occupancy_fields() {
        let slot = StorageSlot::vacant("A-01", Utc::now());
        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(value["status"], "vacant");
        assert!(value.get("customer_name").is_none());
        assert!(value.get("storage_ticket_id").is_none());
    }

    #[test]
    fn on_ride_slot_roundtrips_through_json() {
        let mut slot = StorageSlot::vacant("A-02", Utc::now());
        slot.state = SlotState::OnRide(occupancy());
        let bytes = serde_json::to_vec(&slot).unwrap();
        let back: StorageSlot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.status(), SlotStatus::OnRide);
        assert_eq!(back.storage_ticket_id(), Some("ST-1"));
    }

    #[test]
    fn legacy_log_without_session_deserializes() {
        let json = r#"{"id":"1","action":"checkout","timestamp":"2023-05-01T10:00:00Z"}"#;
        let log: StorageLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.sequence, 0);
        assert!(log.storage_ticket_id.is_none());
    }

    #[test]
    fn overdue_only_when_occupied_past_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut slot = StorageSlot::vacant("A-03", now);
        assert!(!slot.is_overdue(now));
        slot.state = SlotState::Occupied(occupancy());
        assert!(slot.is_overdue(now));
    }
}
