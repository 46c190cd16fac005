use super::*;

#[test]
fn test_create_ticket_numbers_and_customer() {
    let (manager, _clock) = create_test_manager();

    let first = create_ticket(&manager, "Alice", "0811", "Brompton");
    let second = create_ticket(&manager, "Bob", "0822", "Tern");

    assert_eq!(first.ticket_number, "1");
    assert_eq!(second.ticket_number, "2");
    assert_eq!(first.status, TicketStatus::Waiting);
    assert_eq!(first.timestamps.arrival, jan(1, 9));
    assert!(first.id.starts_with("T-"));
    assert_eq!(manager.current_ticket_counter().unwrap(), 2);
    assert_eq!(manager.customers().unwrap().len(), 2);
}

#[test]
fn test_dedup_by_phone_and_case_folded_name() {
    let (manager, _clock) = create_test_manager();

    create_ticket(&manager, "Alice", "0811", "Brompton");
    create_ticket(&manager, "ALICE", "0811", "Tern Link");
    create_ticket(&manager, "Alicia", "0811", "Brompton");

    let customers = manager.customers().unwrap();
    assert_eq!(customers.len(), 2);
    let alice = customers.iter().find(|c| c.name == "Alice").unwrap();
    assert_eq!(alice.bikes, vec!["Brompton", "Tern Link"]);
}

#[test]
fn test_idempotency() {
    let (manager, _clock) = create_test_manager();
    let command = cmd(create_ticket_payload("Alice", "0811", "Brompton"));

    let first = manager.execute_command(command.clone());
    assert!(first.success);
    assert!(first.resource_id.is_some());

    let second = manager.execute_command(command);
    assert!(second.success);
    assert_eq!(second.resource_id, None);
    assert_eq!(manager.tickets().unwrap().len(), 1);
    assert_eq!(manager.current_ticket_counter().unwrap(), 1);
}

#[test]
fn test_blank_customer_name_rejected_without_consuming_number() {
    let (manager, _clock) = create_test_manager();

    let resp = run(&manager, create_ticket_payload("  ", "0811", "Brompton"));
    assert!(!resp.success);
    assert_eq!(resp.error_code(), Some(CommandErrorCode::ValidationFailed));
    assert_eq!(manager.current_ticket_counter().unwrap(), 0);
    assert!(manager.customers().unwrap().is_empty());
}

#[test]
fn test_counter_fault_falls_back_to_latest_number() {
    let (manager, _clock) = create_test_manager();
    create_ticket(&manager, "Alice", "0811", "Brompton");
    create_ticket(&manager, "Bob", "0822", "Tern");

    manager.storage().corrupt_counter().unwrap();

    let ticket = create_ticket(&manager, "Cara", "0833", "Birdy");
    assert_eq!(ticket.ticket_number, "3");
    // Counter rewritten best-effort, next ticket is back on the atomic path
    assert_eq!(manager.current_ticket_counter().unwrap(), 3);
    let next = create_ticket(&manager, "Dan", "0844", "Dahon");
    assert_eq!(next.ticket_number, "4");
}

#[test]
fn test_status_lifecycle_stamps_are_never_overwritten() {
    let (manager, clock) = create_test_manager();
    let ticket = create_ticket(&manager, "Alice", "0811", "Brompton");

    clock.set(jan(1, 10));
    assert!(set_status(&manager, &ticket.id, TicketStatus::Active, None).success);
    clock.set(jan(1, 11));
    assert!(set_status(&manager, &ticket.id, TicketStatus::Ready, None).success);
    clock.set(jan(1, 12));
    assert!(set_status(&manager, &ticket.id, TicketStatus::Active, None).success);
    clock.set(jan(1, 13));
    assert!(set_status(&manager, &ticket.id, TicketStatus::Ready, None).success);
    clock.set(jan(1, 14));
    assert!(set_status(&manager, &ticket.id, TicketStatus::Done, None).success);

    let done = manager.get_ticket(&ticket.id).unwrap().unwrap();
    assert_eq!(done.timestamps.called, Some(jan(1, 10)));
    assert_eq!(done.timestamps.ready, Some(jan(1, 11)));
    assert_eq!(done.timestamps.finished, Some(jan(1, 14)));
}

#[test]
fn test_pending_notes_accumulate_in_order() {
    let (manager, clock) = create_test_manager();
    let id = run_ok(
        &manager,
        ShopCommandPayload::CreateTicket {
            branch: "PIK".to_string(),
            customer_name: "Alice".to_string(),
            phone: "0811".to_string(),
            unit_model: "Brompton".to_string(),
            service_types: vec![],
            notes: "Squeaky brakes".to_string(),
            customer_id: None,
        },
    )
    .unwrap();
    set_status(&manager, &id, TicketStatus::Active, None);

    // 09:00 and 10:30 in Jakarta
    clock.set(Utc.with_ymd_and_hms(2024, 1, 2, 2, 0, 0).unwrap());
    assert!(set_status(&manager, &id, TicketStatus::Pending, Some("waiting for pads")).success);
    clock.set(Utc.with_ymd_and_hms(2024, 1, 2, 3, 30, 0).unwrap());
    assert!(set_status(&manager, &id, TicketStatus::Pending, Some("pads arrived")).success);

    let ticket = manager.get_ticket(&id).unwrap().unwrap();
    assert_eq!(
        ticket.notes,
        "Squeaky brakes | [09:00] waiting for pads | [10:30] pads arrived"
    );
}

#[test]
fn test_cancel_requires_reason_and_records_it() {
    let (manager, _clock) = create_test_manager();
    let ticket = create_ticket(&manager, "Alice", "0811", "Brompton");

    let resp = set_status(&manager, &ticket.id, TicketStatus::Cancelled, None);
    assert_eq!(resp.error_code(), Some(CommandErrorCode::ValidationFailed));

    let resp = run(
        &manager,
        ShopCommandPayload::UpdateTicketStatus {
            ticket_id: ticket.id.clone(),
            status: TicketStatus::Cancelled,
            mechanic: None,
            note: None,
            reason: Some("Customer left".to_string()),
        },
    );
    assert!(resp.success);
    let cancelled = manager.get_ticket(&ticket.id).unwrap().unwrap();
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Customer left"));
    assert!(cancelled.timestamps.finished.is_some());
}

#[test]
fn test_unknown_ticket() {
    let (manager, _clock) = create_test_manager();
    let resp = set_status(&manager, "T-404", TicketStatus::Active, None);
    assert_eq!(resp.error_code(), Some(CommandErrorCode::TicketNotFound));
}

#[test]
fn test_ticket_kpi_for_branch() {
    let (manager, clock) = create_test_manager();
    let a = create_ticket(&manager, "Alice", "0811", "Brompton");
    let b = create_ticket(&manager, "Bob", "0822", "Tern");
    create_ticket(&manager, "Cara", "0833", "Birdy");

    set_status(&manager, &a.id, TicketStatus::Active, None);
    set_status(&manager, &b.id, TicketStatus::Active, None);
    set_status(&manager, &b.id, TicketStatus::Ready, None);
    set_status(&manager, &b.id, TicketStatus::Done, None);

    let kpi = manager.ticket_kpi(Some("PIK")).unwrap();
    assert_eq!(kpi.waiting, 1);
    assert_eq!(kpi.in_progress, 1);
    assert_eq!(kpi.finished_today, 1);
    assert_eq!(kpi.total, 3);

    // Next business day: closures drop out, live tickets stay
    clock.set(jan(3, 9));
    let kpi = manager.ticket_kpi(Some("PIK")).unwrap();
    assert_eq!(kpi.finished_today, 0);
    assert_eq!(kpi.total, 2);
    assert_eq!(manager.ticket_kpi(Some("BSD")).unwrap().total, 0);
}

#[test]
fn test_admin_operations_need_confirmation() {
    let (manager, _clock) = create_test_manager();
    create_ticket(&manager, "Alice", "0811", "Brompton");

    let resp = run(
        &manager,
        ShopCommandPayload::WipeServiceData {
            confirmation: "confirm".to_string(),
        },
    );
    assert_eq!(resp.error_code(), Some(CommandErrorCode::ConfirmationRequired));
    assert_eq!(manager.tickets().unwrap().len(), 1);

    run_ok(
        &manager,
        ShopCommandPayload::WipeServiceData {
            confirmation: "CONFIRM".to_string(),
        },
    );
    assert!(manager.tickets().unwrap().is_empty());
    assert!(manager.customers().unwrap().is_empty());
    // Counter survives a data wipe
    assert_eq!(manager.current_ticket_counter().unwrap(), 1);

    run_ok(
        &manager,
        ShopCommandPayload::ResetTicketCounter {
            confirmation: "CONFIRM".to_string(),
        },
    );
    assert_eq!(create_ticket(&manager, "Bob", "0822", "Tern").ticket_number, "1");
}

#[tokio::test]
async fn test_subscription_receives_full_snapshots() {
    let (manager, _clock) = create_test_manager();
    let (initial, mut rx) = manager.subscribe(Collection::Tickets).unwrap();
    assert!(initial.is_empty());

    create_ticket(&manager, "Alice", "0811", "Brompton");
    create_ticket(&manager, "Bob", "0822", "Tern");

    let first = rx.recv().await.unwrap();
    assert_eq!(first.len(), 1);
    let second = rx.recv().await.unwrap();
    match second.as_ref() {
        StoreSnapshot::Tickets(tickets) => {
            assert_eq!(tickets.len(), 2);
            assert_eq!(tickets[0].customer_name, "Bob");
        }
        other => panic!("unexpected snapshot {:?}", other.collection()),
    }
}

#[tokio::test]
async fn test_failed_command_publishes_nothing() {
    let (manager, _clock) = create_test_manager();
    let (_, mut rx) = manager.subscribe(Collection::Tickets).unwrap();

    let resp = set_status(&manager, "T-404", TicketStatus::Active, None);
    assert!(!resp.success);
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}
