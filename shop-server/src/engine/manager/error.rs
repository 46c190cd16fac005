use super::super::storage::StorageError;
use super::super::traits::ActionError;
use shared::command::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    #[error("Slot {0} is not vacant")]
    SlotNotVacant(String),

    #[error("Slot {0} is not occupied")]
    SlotNotOccupied(String),

    #[error("Slot {0} is not on a ride")]
    SlotNotOnRide(String),

    #[error("Storage request not found: {0}")]
    RequestNotFound(String),

    #[error("Storage request {0} is not pending")]
    RequestNotPending(String),

    #[error("Catalog entry not found: {0}")]
    CatalogEntryNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} requires typing CONFIRM")]
    ConfirmationRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Map a storage failure to an error code (the UI localizes it)
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    if let StorageError::Serialization(_) = e {
        return CommandErrorCode::InternalError;
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }

    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return CommandErrorCode::OutOfMemory;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    // Database/Transaction/Table/Storage/Commit errors default to busy
    CommandErrorCode::SystemBusy
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string();
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            ManagerError::TicketNotFound(id) => (
                CommandErrorCode::TicketNotFound,
                format!("Ticket not found: {}", id),
            ),
            ManagerError::CustomerNotFound(id) => (
                CommandErrorCode::CustomerNotFound,
                format!("Customer not found: {}", id),
            ),
            ManagerError::SlotNotFound(id) => (
                CommandErrorCode::SlotNotFound,
                format!("Slot not found: {}", id),
            ),
            ManagerError::SlotNotVacant(id) => (
                CommandErrorCode::SlotNotVacant,
                format!("Slot {} is not vacant", id),
            ),
            ManagerError::SlotNotOccupied(id) => (
                CommandErrorCode::SlotNotOccupied,
                format!("Slot {} is not occupied", id),
            ),
            ManagerError::SlotNotOnRide(id) => (
                CommandErrorCode::SlotNotOnRide,
                format!("Slot {} is not on a ride", id),
            ),
            ManagerError::RequestNotFound(id) => (
                CommandErrorCode::RequestNotFound,
                format!("Storage request not found: {}", id),
            ),
            ManagerError::RequestNotPending(id) => (
                CommandErrorCode::RequestNotPending,
                format!("Storage request {} is not pending", id),
            ),
            ManagerError::CatalogEntryNotFound(id) => (
                CommandErrorCode::CatalogEntryNotFound,
                format!("Catalog entry not found: {}", id),
            ),
            ManagerError::Validation(msg) => (CommandErrorCode::ValidationFailed, msg),
            ManagerError::ConfirmationRequired(op) => (
                CommandErrorCode::ConfirmationRequired,
                format!("{} requires typing CONFIRM", op),
            ),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg),
        };
        CommandError::new(code, message)
    }
}

impl From<ActionError> for ManagerError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::TicketNotFound(id) => ManagerError::TicketNotFound(id),
            ActionError::CustomerNotFound(id) => ManagerError::CustomerNotFound(id),
            ActionError::SlotNotFound(id) => ManagerError::SlotNotFound(id),
            ActionError::SlotNotVacant(id) => ManagerError::SlotNotVacant(id),
            ActionError::SlotNotOccupied(id) => ManagerError::SlotNotOccupied(id),
            ActionError::SlotNotOnRide(id) => ManagerError::SlotNotOnRide(id),
            ActionError::RequestNotFound(id) => ManagerError::RequestNotFound(id),
            ActionError::RequestNotPending(id) => ManagerError::RequestNotPending(id),
            ActionError::CatalogEntryNotFound(id) => ManagerError::CatalogEntryNotFound(id),
            ActionError::Validation(msg) => ManagerError::Validation(msg),
            ActionError::ConfirmationRequired(op) => ManagerError::ConfirmationRequired(op),
            ActionError::Storage(e) => ManagerError::Storage(e),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
