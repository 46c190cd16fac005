//! Bike shop engine - repair queue and storage slots
//!
//! # Module layout
//!
//! ```text
//! shop-server/src/
//! ├── core/      # configuration, clock
//! ├── engine/    # commands, redb storage, snapshot bus
//! ├── reports/   # sessions, KPI summaries
//! └── utils/     # logging, time helpers
//! ```

pub mod core;
pub mod engine;
pub mod reports;
pub mod utils;

pub use core::{Clock, Config, ManualClock, SystemClock};
pub use engine::{ManagerError, ShopManager, ShopStorage, SnapshotBus};
pub use reports::{StorageKpi, StorageSession, TicketKpi};
pub use utils::{init_logger, init_logger_with_file};

/// Load `.env`, create the work dir and install the logger
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    std::fs::create_dir_all(&config.work_dir)?;
    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(
        Some(&config.log_level),
        config.is_production(),
        config.log_dir.as_deref(),
    );
    Ok(config)
}
