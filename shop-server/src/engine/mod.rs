//! Transactional state engine
//!
//! - **manager**: `ShopManager`, command processing and snapshot publishing
//! - **storage**: redb-backed document store, indices and seeding
//! - **actions**: one handler per command
//! - **identity**: customer find-or-create
//! - **sequence**: ticket number allocation and its degraded fallback
//! - **bus**: per-collection snapshot channels
//!
//! # Architecture
//!
//! ```text
//! ShopCommand → ShopManager → CommandAction → redb write txn
//!                    ↓                             ↓
//!              CommandResponse                  commit
//!                                                  ↓
//!                                    SnapshotBus (full collections)
//! ```

pub mod actions;
pub mod bus;
pub mod identity;
pub mod manager;
pub mod sequence;
pub mod storage;
pub mod traits;

pub use bus::SnapshotBus;
pub use manager::{ManagerError, ManagerResult, ShopManager};
pub use storage::{ShopStorage, StorageError};
