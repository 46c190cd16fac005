//! Commands accepted by the shop engine
//!
//! Every mutation travels as a [`ShopCommand`]. The engine runs each one
//! as a single atomic unit and answers with a [`CommandResponse`].

pub mod types;

pub use types::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TicketStatus;

/// Command envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopCommand {
    /// Idempotency key (UUID v4)
    pub command_id: String,
    /// Operator name (for logs)
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds), informational only
    pub timestamp: i64,
    pub payload: ShopCommandPayload,
}

impl ShopCommand {
    pub fn new(operator_name: impl Into<String>, payload: ShopCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_name: operator_name.into(),
            timestamp: crate::util::now_millis(),
            payload,
        }
    }
}

/// Customer identity supplied with a check-in
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerInput {
    /// Known customer id; absent means dedup by phone + name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub name: String,
    pub phone: String,
}

/// Operator-corrected fields used when approving a storage request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalFields {
    pub name: String,
    pub phone: String,
    pub bike_model: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Command payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShopCommandPayload {
    // ========== Tickets ==========
    CreateTicket {
        branch: String,
        customer_name: String,
        phone: String,
        unit_model: String,
        service_types: Vec<String>,
        #[serde(default)]
        notes: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_id: Option<String>,
    },
    UpdateTicketStatus {
        ticket_id: String,
        status: TicketStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mechanic: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    UpdateTicketServices {
        ticket_id: String,
        service_types: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },

    // ========== Customers ==========
    UpdateCustomer {
        customer_id: String,
        name: String,
        phone: String,
        bikes: Vec<String>,
    },
    RemoveCustomer {
        customer_id: String,
    },

    // ========== Storage slots ==========
    CheckIn {
        slot_id: String,
        customer: CustomerInput,
        bike_model: String,
        in_date: DateTime<Utc>,
        expiry_date: DateTime<Utc>,
        #[serde(default)]
        notes: String,
        #[serde(default)]
        photos: Vec<String>,
    },
    RideOut {
        slot_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo: Option<String>,
    },
    RideReturn {
        slot_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo: Option<String>,
    },
    Checkout {
        slot_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo: Option<String>,
    },
    AdjustContract {
        slot_id: String,
        in_date: DateTime<Utc>,
        expiry_date: DateTime<Utc>,
    },
    MoveSlot {
        from_slot_id: String,
        to_slot_id: String,
    },

    // ========== Storage requests ==========
    SubmitStorageRequest {
        name: String,
        phone: String,
        bike_model: String,
        duration_months: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    ApproveStorageRequest {
        request_id: String,
        slot_id: String,
        fields: ApprovalFields,
    },
    RejectStorageRequest {
        request_id: String,
    },
    DeleteStorageRequest {
        request_id: String,
    },

    // ========== Catalog ==========
    AddMechanic {
        name: String,
        branches: Vec<String>,
    },
    UpdateMechanic {
        mechanic_id: String,
        name: String,
        branches: Vec<String>,
    },
    RemoveMechanic {
        mechanic_id: String,
    },
    AddService {
        name: String,
        branches: Vec<String>,
    },
    UpdateService {
        service_id: String,
        name: String,
        branches: Vec<String>,
    },
    RemoveService {
        service_id: String,
    },

    // ========== Admin (destructive, confirmation required) ==========
    ResetTicketCounter {
        confirmation: String,
    },
    WipeServiceData {
        confirmation: String,
    },
    WipeStorageData {
        confirmation: String,
    },
}

impl ShopCommandPayload {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ShopCommandPayload::CreateTicket { .. } => "create_ticket",
            ShopCommandPayload::UpdateTicketStatus { .. } => "update_ticket_status",
            ShopCommandPayload::UpdateTicketServices { .. } => "update_ticket_services",
            ShopCommandPayload::UpdateCustomer { .. } => "update_customer",
            ShopCommandPayload::RemoveCustomer { .. } => "remove_customer",
            ShopCommandPayload::CheckIn { .. } => "check_in",
            ShopCommandPayload::RideOut { .. } => "ride_out",
            ShopCommandPayload::RideReturn { .. } => "ride_return",
            ShopCommandPayload::Checkout { .. } => "checkout",
            ShopCommandPayload::AdjustContract { .. } => "adjust_contract",
            ShopCommandPayload::MoveSlot { .. } => "move_slot",
            ShopCommandPayload::SubmitStorageRequest { .. } => "submit_storage_request",
            ShopCommandPayload::ApproveStorageRequest { .. } => "approve_storage_request",
            ShopCommandPayload::RejectStorageRequest { .. } => "reject_storage_request",
            ShopCommandPayload::DeleteStorageRequest { .. } => "delete_storage_request",
            ShopCommandPayload::AddMechanic { .. } => "add_mechanic",
            ShopCommandPayload::UpdateMechanic { .. } => "update_mechanic",
            ShopCommandPayload::RemoveMechanic { .. } => "remove_mechanic",
            ShopCommandPayload::AddService { .. } => "add_service",
            ShopCommandPayload::UpdateService { .. } => "update_service",
            ShopCommandPayload::RemoveService { .. } => "remove_service",
            ShopCommandPayload::ResetTicketCounter { .. } => "reset_ticket_counter",
            ShopCommandPayload::WipeServiceData { .. } => "wipe_service_data",
            ShopCommandPayload::WipeStorageData { .. } => "wipe_storage_data",
        }
    }
}
