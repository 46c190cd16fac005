use super::*;
use crate::core::ManualClock;
use chrono::TimeZone;
use shared::command::{ApprovalFields, CommandErrorCode, CustomerInput, ShopCommandPayload};
use shared::models::{LogAction, SlotStatus, TicketStatus};

// ========================================================================
// Helpers
// ========================================================================

fn jan(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn test_config() -> Config {
    let mut config = Config::with_overrides("/tmp/shop-manager-tests", 5);
    config.slot_prefix = "A".to_string();
    config.timezone = chrono_tz::Asia::Jakarta;
    config.snapshot_channel_capacity = 16;
    config
}

fn create_test_manager() -> (ShopManager, ManualClock) {
    let clock = ManualClock::new(jan(1, 9));
    let storage = ShopStorage::open_in_memory().unwrap();
    let manager = ShopManager::new(storage, &test_config(), Arc::new(clock.clone())).unwrap();
    (manager, clock)
}

fn cmd(payload: ShopCommandPayload) -> ShopCommand {
    ShopCommand::new("Front Desk", payload)
}

fn run(manager: &ShopManager, payload: ShopCommandPayload) -> CommandResponse {
    manager.execute_command(cmd(payload))
}

fn run_ok(manager: &ShopManager, payload: ShopCommandPayload) -> Option<String> {
    let resp = run(manager, payload);
    assert!(resp.success, "command failed: {:?}", resp.error);
    resp.resource_id
}

fn create_ticket_payload(name: &str, phone: &str, model: &str) -> ShopCommandPayload {
    ShopCommandPayload::CreateTicket {
        branch: "PIK".to_string(),
        customer_name: name.to_string(),
        phone: phone.to_string(),
        unit_model: model.to_string(),
        service_types: vec!["General Service".to_string()],
        notes: String::new(),
        customer_id: None,
    }
}

fn create_ticket(manager: &ShopManager, name: &str, phone: &str, model: &str) -> Ticket {
    let id = run_ok(manager, create_ticket_payload(name, phone, model)).unwrap();
    manager.get_ticket(&id).unwrap().unwrap()
}

fn set_status(
    manager: &ShopManager,
    ticket_id: &str,
    status: TicketStatus,
    note: Option<&str>,
) -> CommandResponse {
    run(
        manager,
        ShopCommandPayload::UpdateTicketStatus {
            ticket_id: ticket_id.to_string(),
            status,
            mechanic: None,
            note: note.map(str::to_string),
            reason: None,
        },
    )
}

fn check_in_payload(slot_id: &str, name: &str, phone: &str, model: &str) -> ShopCommandPayload {
    ShopCommandPayload::CheckIn {
        slot_id: slot_id.to_string(),
        customer: CustomerInput {
            customer_id: None,
            name: name.to_string(),
            phone: phone.to_string(),
        },
        bike_model: model.to_string(),
        in_date: jan(1, 0),
        expiry_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        notes: String::new(),
        photos: Vec::new(),
    }
}

fn slot(manager: &ShopManager, slot_id: &str) -> StorageSlot {
    manager.get_slot(slot_id).unwrap().unwrap()
}

fn submit_request(manager: &ShopManager, name: &str) -> String {
    run_ok(
        manager,
        ShopCommandPayload::SubmitStorageRequest {
            name: name.to_string(),
            phone: "0899".to_string(),
            bike_model: "Tern Verge".to_string(),
            duration_months: 3,
            notes: Some("Needs a cover".to_string()),
        },
    )
    .unwrap()
}

/// Exactly one of vacant-without-occupancy or stored-with-occupancy holds
fn assert_slot_invariant(s: &StorageSlot) {
    match s.status() {
        SlotStatus::Vacant => assert!(s.occupancy().is_none(), "{} vacant with occupancy", s.id),
        SlotStatus::Occupied | SlotStatus::OnRide => {
            let occ = s.occupancy().expect("stored slot without occupancy");
            assert!(!occ.storage_ticket_id.is_empty());
            assert!(!occ.customer_name.is_empty());
        }
    }
}

mod test_tickets;
