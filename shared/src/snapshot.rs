//! Full-collection snapshots pushed to subscribers
//!
//! Subscribers never receive diffs: every emission is the complete
//! current state of one collection and projections recompute from it.

use serde::{Deserialize, Serialize};

use crate::models::{
    Customer, MechanicDefinition, ServiceDefinition, StorageRequest, StorageSlot, Ticket,
};

/// Subscribable collections
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Tickets,
    Customers,
    Slots,
    Requests,
    Mechanics,
    Services,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Tickets,
        Collection::Customers,
        Collection::Slots,
        Collection::Requests,
        Collection::Mechanics,
        Collection::Services,
    ];
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Collection::Tickets => "tickets",
            Collection::Customers => "customers",
            Collection::Slots => "slots",
            Collection::Requests => "requests",
            Collection::Mechanics => "mechanics",
            Collection::Services => "services",
        };
        f.write_str(s)
    }
}

/// Snapshot of one collection
///
/// Ordering: tickets by arrival (newest first), customers by name, slots
/// by id, requests (pending only) by submission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "collection", content = "documents", rename_all = "snake_case")]
pub enum StoreSnapshot {
    Tickets(Vec<Ticket>),
    Customers(Vec<Customer>),
    Slots(Vec<StorageSlot>),
    Requests(Vec<StorageRequest>),
    Mechanics(Vec<MechanicDefinition>),
    Services(Vec<ServiceDefinition>),
}

impl StoreSnapshot {
    pub fn collection(&self) -> Collection {
        match self {
            StoreSnapshot::Tickets(_) => Collection::Tickets,
            StoreSnapshot::Customers(_) => Collection::Customers,
            StoreSnapshot::Slots(_) => Collection::Slots,
            StoreSnapshot::Requests(_) => Collection::Requests,
            StoreSnapshot::Mechanics(_) => Collection::Mechanics,
            StoreSnapshot::Services(_) => Collection::Services,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StoreSnapshot::Tickets(v) => v.len(),
            StoreSnapshot::Customers(v) => v.len(),
            StoreSnapshot::Slots(v) => v.len(),
            StoreSnapshot::Requests(v) => v.len(),
            StoreSnapshot::Mechanics(v) => v.len(),
            StoreSnapshot::Services(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
