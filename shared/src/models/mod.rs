//! Document models stored by the shop engine

pub mod catalog;
pub mod customer;
pub mod storage_request;
pub mod storage_slot;
pub mod ticket;

pub use catalog::{DEFAULT_MECHANICS, DEFAULT_SERVICES, MechanicDefinition, ServiceDefinition};
pub use customer::Customer;
pub use storage_request::{RequestStatus, StorageRequest};
pub use storage_slot::{
    CustomerSnapshot, LogAction, Occupancy, SlotState, SlotStatus, StorageLog, StorageSlot,
};
pub use ticket::{Ticket, TicketStatus, TicketTimestamps, ordered_services};
