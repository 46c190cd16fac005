//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use shared::command::{ShopCommand, ShopCommandPayload};
use shared::models::{MechanicDefinition, ServiceDefinition};

use crate::engine::sequence::NumberSource;
use crate::engine::traits::{
    ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
};

mod adjust_contract;
mod admin;
mod catalog;
mod check_in;
mod checkout;
mod create_ticket;
mod customers;
mod move_slot;
mod requests;
mod ride;
mod update_ticket;

pub use adjust_contract::AdjustContractAction;
pub use admin::{
    CONFIRMATION_PHRASE, ResetTicketCounterAction, SlotLayout, WipeServiceDataAction,
    WipeStorageDataAction,
};
pub use catalog::{
    AddCatalogEntryAction, CatalogEntry, RemoveCatalogEntryAction, UpdateCatalogEntryAction,
};
pub use check_in::{CheckInAction, Placement};
pub use checkout::CheckoutAction;
pub use create_ticket::CreateTicketAction;
pub use customers::{RemoveCustomerAction, UpdateCustomerAction};
pub use move_slot::MoveSlotAction;
pub use requests::{
    ApproveStorageRequestAction, DeleteStorageRequestAction, RejectStorageRequestAction,
    SubmitStorageRequestAction,
};
pub use ride::{RideOutAction, RideReturnAction};
pub use update_ticket::{UpdateTicketServicesAction, UpdateTicketStatusAction};

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    CreateTicket(CreateTicketAction),
    UpdateTicketStatus(UpdateTicketStatusAction),
    UpdateTicketServices(UpdateTicketServicesAction),
    UpdateCustomer(UpdateCustomerAction),
    RemoveCustomer(RemoveCustomerAction),
    CheckIn(CheckInAction),
    RideOut(RideOutAction),
    RideReturn(RideReturnAction),
    Checkout(CheckoutAction),
    AdjustContract(AdjustContractAction),
    MoveSlot(MoveSlotAction),
    SubmitStorageRequest(SubmitStorageRequestAction),
    ApproveStorageRequest(ApproveStorageRequestAction),
    RejectStorageRequest(RejectStorageRequestAction),
    DeleteStorageRequest(DeleteStorageRequestAction),
    AddMechanic(AddCatalogEntryAction<MechanicDefinition>),
    UpdateMechanic(UpdateCatalogEntryAction<MechanicDefinition>),
    RemoveMechanic(RemoveCatalogEntryAction<MechanicDefinition>),
    AddService(AddCatalogEntryAction<ServiceDefinition>),
    UpdateService(UpdateCatalogEntryAction<ServiceDefinition>),
    RemoveService(RemoveCatalogEntryAction<ServiceDefinition>),
    ResetTicketCounter(ResetTicketCounterAction),
    WipeServiceData(WipeServiceDataAction),
    WipeStorageData(WipeStorageDataAction),
}

impl CommandHandler for CommandAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        match self {
            CommandAction::CreateTicket(action) => action.execute(ctx, metadata),
            CommandAction::UpdateTicketStatus(action) => action.execute(ctx, metadata),
            CommandAction::UpdateTicketServices(action) => action.execute(ctx, metadata),
            CommandAction::UpdateCustomer(action) => action.execute(ctx, metadata),
            CommandAction::RemoveCustomer(action) => action.execute(ctx, metadata),
            CommandAction::CheckIn(action) => action.execute(ctx, metadata),
            CommandAction::RideOut(action) => action.execute(ctx, metadata),
            CommandAction::RideReturn(action) => action.execute(ctx, metadata),
            CommandAction::Checkout(action) => action.execute(ctx, metadata),
            CommandAction::AdjustContract(action) => action.execute(ctx, metadata),
            CommandAction::MoveSlot(action) => action.execute(ctx, metadata),
            CommandAction::SubmitStorageRequest(action) => action.execute(ctx, metadata),
            CommandAction::ApproveStorageRequest(action) => action.execute(ctx, metadata),
            CommandAction::RejectStorageRequest(action) => action.execute(ctx, metadata),
            CommandAction::DeleteStorageRequest(action) => action.execute(ctx, metadata),
            CommandAction::AddMechanic(action) => action.execute(ctx, metadata),
            CommandAction::UpdateMechanic(action) => action.execute(ctx, metadata),
            CommandAction::RemoveMechanic(action) => action.execute(ctx, metadata),
            CommandAction::AddService(action) => action.execute(ctx, metadata),
            CommandAction::UpdateService(action) => action.execute(ctx, metadata),
            CommandAction::RemoveService(action) => action.execute(ctx, metadata),
            CommandAction::ResetTicketCounter(action) => action.execute(ctx, metadata),
            CommandAction::WipeServiceData(action) => action.execute(ctx, metadata),
            CommandAction::WipeStorageData(action) => action.execute(ctx, metadata),
        }
    }
}

impl CommandAction {
    /// Convert a ShopCommand into its action
    ///
    /// This is the ONLY place with a match on ShopCommandPayload. The slot
    /// layout is injected because storage wipes re-seed slots.
    pub fn build(cmd: &ShopCommand, layout: &SlotLayout) -> Self {
        match &cmd.payload {
            ShopCommandPayload::CreateTicket {
                branch,
                customer_name,
                phone,
                unit_model,
                service_types,
                notes,
                customer_id,
            } => CommandAction::CreateTicket(CreateTicketAction {
                branch: branch.clone(),
                customer_name: customer_name.clone(),
                phone: phone.clone(),
                unit_model: unit_model.clone(),
                service_types: service_types.clone(),
                notes: notes.clone(),
                customer_id: customer_id.clone(),
                number: NumberSource::Counter,
            }),
            ShopCommandPayload::UpdateTicketStatus {
                ticket_id,
                status,
                mechanic,
                note,
                reason,
            } => CommandAction::UpdateTicketStatus(UpdateTicketStatusAction {
                ticket_id: ticket_id.clone(),
                status: *status,
                mechanic: mechanic.clone(),
                note: note.clone(),
                reason: reason.clone(),
            }),
            ShopCommandPayload::UpdateTicketServices {
                ticket_id,
                service_types,
                notes,
            } => CommandAction::UpdateTicketServices(UpdateTicketServicesAction {
                ticket_id: ticket_id.clone(),
                service_types: service_types.clone(),
                notes: notes.clone(),
            }),
            ShopCommandPayload::UpdateCustomer {
                customer_id,
                name,
                phone,
                bikes,
            } => CommandAction::UpdateCustomer(UpdateCustomerAction {
                customer_id: customer_id.clone(),
                name: name.clone(),
                phone: phone.clone(),
                bikes: bikes.clone(),
            }),
            ShopCommandPayload::RemoveCustomer { customer_id } => {
                CommandAction::RemoveCustomer(RemoveCustomerAction {
                    customer_id: customer_id.clone(),
                })
            }
            ShopCommandPayload::CheckIn {
                slot_id,
                customer,
                bike_model,
                in_date,
                expiry_date,
                notes,
                photos,
            } => CommandAction::CheckIn(CheckInAction {
                slot_id: slot_id.clone(),
                customer: customer.clone(),
                placement: Placement {
                    bike_model: bike_model.clone(),
                    in_date: *in_date,
                    expiry_date: *expiry_date,
                    notes: notes.clone(),
                    photos: photos.clone(),
                },
            }),
            ShopCommandPayload::RideOut {
                slot_id,
                notes,
                photo,
            } => CommandAction::RideOut(RideOutAction {
                slot_id: slot_id.clone(),
                notes: notes.clone(),
                photo: photo.clone(),
            }),
            ShopCommandPayload::RideReturn {
                slot_id,
                notes,
                photo,
            } => CommandAction::RideReturn(RideReturnAction {
                slot_id: slot_id.clone(),
                notes: notes.clone(),
                photo: photo.clone(),
            }),
            ShopCommandPayload::Checkout {
                slot_id,
                notes,
                photo,
            } => CommandAction::Checkout(CheckoutAction {
                slot_id: slot_id.clone(),
                notes: notes.clone(),
                photo: photo.clone(),
            }),
            ShopCommandPayload::AdjustContract {
                slot_id,
                in_date,
                expiry_date,
            } => CommandAction::AdjustContract(AdjustContractAction {
                slot_id: slot_id.clone(),
                in_date: *in_date,
                expiry_date: *expiry_date,
            }),
            ShopCommandPayload::MoveSlot {
                from_slot_id,
                to_slot_id,
            } => CommandAction::MoveSlot(MoveSlotAction {
                from_slot_id: from_slot_id.clone(),
                to_slot_id: to_slot_id.clone(),
            }),
            ShopCommandPayload::SubmitStorageRequest {
                name,
                phone,
                bike_model,
                duration_months,
                notes,
            } => CommandAction::SubmitStorageRequest(SubmitStorageRequestAction {
                name: name.clone(),
                phone: phone.clone(),
                bike_model: bike_model.clone(),
                duration_months: *duration_months,
                notes: notes.clone(),
            }),
            ShopCommandPayload::ApproveStorageRequest {
                request_id,
                slot_id,
                fields,
            } => CommandAction::ApproveStorageRequest(ApproveStorageRequestAction {
                request_id: request_id.clone(),
                slot_id: slot_id.clone(),
                fields: fields.clone(),
            }),
            ShopCommandPayload::RejectStorageRequest { request_id } => {
                CommandAction::RejectStorageRequest(RejectStorageRequestAction {
                    request_id: request_id.clone(),
                })
            }
            ShopCommandPayload::DeleteStorageRequest { request_id } => {
                CommandAction::DeleteStorageRequest(DeleteStorageRequestAction {
                    request_id: request_id.clone(),
                })
            }
            ShopCommandPayload::AddMechanic { name, branches } => {
                CommandAction::AddMechanic(AddCatalogEntryAction::new(name, branches.clone()))
            }
            ShopCommandPayload::UpdateMechanic {
                mechanic_id,
                name,
                branches,
            } => CommandAction::UpdateMechanic(UpdateCatalogEntryAction::new(
                mechanic_id,
                name,
                branches.clone(),
            )),
            ShopCommandPayload::RemoveMechanic { mechanic_id } => {
                CommandAction::RemoveMechanic(RemoveCatalogEntryAction::new(mechanic_id))
            }
            ShopCommandPayload::AddService { name, branches } => {
                CommandAction::AddService(AddCatalogEntryAction::new(name, branches.clone()))
            }
            ShopCommandPayload::UpdateService {
                service_id,
                name,
                branches,
            } => CommandAction::UpdateService(UpdateCatalogEntryAction::new(
                service_id,
                name,
                branches.clone(),
            )),
            ShopCommandPayload::RemoveService { service_id } => {
                CommandAction::RemoveService(RemoveCatalogEntryAction::new(service_id))
            }
            ShopCommandPayload::ResetTicketCounter { confirmation } => {
                CommandAction::ResetTicketCounter(ResetTicketCounterAction {
                    confirmation: confirmation.clone(),
                })
            }
            ShopCommandPayload::WipeServiceData { confirmation } => {
                CommandAction::WipeServiceData(WipeServiceDataAction {
                    confirmation: confirmation.clone(),
                })
            }
            ShopCommandPayload::WipeStorageData { confirmation } => {
                CommandAction::WipeStorageData(WipeStorageDataAction {
                    confirmation: confirmation.clone(),
                    layout: layout.clone(),
                })
            }
        }
    }
}
