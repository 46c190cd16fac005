//! Re-opening an on-disk store keeps counter, slots and history

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use shared::command::{CustomerInput, ShopCommand, ShopCommandPayload};
use shared::models::{LogAction, SlotStatus};
use shop_server::{Config, ManualClock, ShopManager, ShopStorage};

fn config(dir: &std::path::Path) -> Config {
    let mut config = Config::with_overrides(dir.to_string_lossy(), 4);
    config.slot_prefix = "B".to_string();
    config
}

fn open(config: &Config) -> ShopManager {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
    let storage = ShopStorage::open(config.db_path()).unwrap();
    ShopManager::new(storage, config, Arc::new(clock)).unwrap()
}

fn execute(manager: &ShopManager, payload: ShopCommandPayload) -> Option<String> {
    let resp = manager.execute_command(ShopCommand::new("Front Desk", payload));
    assert!(resp.success, "{:?}", resp.error);
    resp.resource_id
}

#[test]
fn reopen_keeps_counter_slots_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    let session = {
        let manager = open(&config);
        for phone in ["0811", "0822"] {
            execute(
                &manager,
                ShopCommandPayload::CreateTicket {
                    branch: "PIK".to_string(),
                    customer_name: "Alice".to_string(),
                    phone: phone.to_string(),
                    unit_model: "Brompton".to_string(),
                    service_types: vec![],
                    notes: String::new(),
                    customer_id: None,
                },
            );
        }
        let session = execute(
            &manager,
            ShopCommandPayload::CheckIn {
                slot_id: "B-01".to_string(),
                customer: CustomerInput {
                    customer_id: None,
                    name: "Alice".to_string(),
                    phone: "0811".to_string(),
                },
                bike_model: "Brompton".to_string(),
                in_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                expiry_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                notes: String::new(),
                photos: vec![],
            },
        )
        .unwrap();
        execute(
            &manager,
            ShopCommandPayload::MoveSlot {
                from_slot_id: "B-01".to_string(),
                to_slot_id: "B-03".to_string(),
            },
        );
        session
    };

    let manager = open(&config);
    assert_eq!(manager.current_ticket_counter().unwrap(), 2);
    assert_eq!(manager.tickets().unwrap().len(), 2);

    // Seeding does not run twice
    let slots = manager.slots().unwrap();
    assert_eq!(slots.len(), 4);
    let b03 = slots.iter().find(|s| s.id == "B-03").unwrap();
    assert_eq!(b03.status(), SlotStatus::Occupied);
    assert_eq!(b03.storage_ticket_id(), Some(session.as_str()));
    let b01 = slots.iter().find(|s| s.id == "B-01").unwrap();
    let actions: Vec<_> = b01.history.iter().map(|l| l.action).collect();
    assert_eq!(actions, vec![LogAction::CheckIn, LogAction::Checkout]);

    let sessions = manager.sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].current_slot, "B-03");
    assert!(sessions[0].is_active());

    // Log sequence keeps climbing across restarts
    let last_before = b03.history.last().unwrap().sequence;
    execute(
        &manager,
        ShopCommandPayload::Checkout {
            slot_id: "B-03".to_string(),
            notes: None,
            photo: None,
        },
    );
    let b03 = manager.get_slot("B-03").unwrap().unwrap();
    assert!(b03.history.last().unwrap().sequence > last_before);

    let next = execute(
        &manager,
        ShopCommandPayload::CreateTicket {
            branch: "PIK".to_string(),
            customer_name: "Bob".to_string(),
            phone: "0833".to_string(),
            unit_model: "Tern".to_string(),
            service_types: vec![],
            notes: String::new(),
            customer_id: None,
        },
    )
    .unwrap();
    let ticket = manager.get_ticket(&next).unwrap().unwrap();
    assert_eq!(ticket.ticket_number, "3");
}

#[test]
fn replayed_command_after_restart_is_a_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let command = ShopCommand::new(
        "Front Desk",
        ShopCommandPayload::SubmitStorageRequest {
            name: "Cara".to_string(),
            phone: "0899".to_string(),
            bike_model: "Tern Verge".to_string(),
            duration_months: 2,
            notes: None,
        },
    );

    {
        let manager = open(&config);
        assert!(manager.execute_command(command.clone()).success);
    }

    let manager = open(&config);
    let resp = manager.execute_command(command);
    assert!(resp.success);
    assert_eq!(resp.resource_id, None);
    assert_eq!(manager.pending_requests().unwrap().len(), 1);
}
