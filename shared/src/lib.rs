//! Shared types for the bike shop engine
//!
//! Document models, the command envelope, response/error codes and
//! snapshot messages used by the engine and its clients.

pub mod command;
pub mod models;
pub mod snapshot;
pub mod util;

// Re-exports
pub use command::{
    ApprovalFields, CommandError, CommandErrorCode, CommandResponse, CustomerInput, ShopCommand,
    ShopCommandPayload,
};
pub use serde::{Deserialize, Serialize};
pub use snapshot::{Collection, StoreSnapshot};
