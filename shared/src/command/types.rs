//! Command response types

use serde::{Deserialize, Serialize};

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Id of the document the command created (ticket, session, request, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, resource_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            resource_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            resource_id: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            resource_id: None,
            error: None,
        }
    }

    /// Error code, if the command failed
    pub fn error_code(&self) -> Option<CommandErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Command error codes (the UI localizes these)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    TicketNotFound,
    CustomerNotFound,
    SlotNotFound,
    SlotNotVacant,
    SlotNotOccupied,
    SlotNotOnRide,
    RequestNotFound,
    RequestNotPending,
    CatalogEntryNotFound,
    ValidationFailed,
    ConfirmationRequired,
    InternalError,
    // Storage errors
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}
