use std::path::PathBuf;

use chrono_tz::Tz;

/// Shop engine configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/bikeshop | Working directory (database, logs) |
/// | DB_FILE | shop.redb | Database file name inside WORK_DIR |
/// | SLOT_PREFIX | A | Storage slot id prefix |
/// | SLOT_COUNT | 30 | Number of storage slots seeded on first start |
/// | BUSINESS_TZ | Asia/Jakarta | Business timezone (note stamps, "today") |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | (unset) | Daily-rolling log file directory |
/// | ENVIRONMENT | development | Runtime environment |
/// | SNAPSHOT_CHANNEL_CAPACITY | 256 | Per-collection snapshot channel capacity |
///
/// ```ignore
/// WORK_DIR=/data/shop SLOT_COUNT=40 cargo run -p shop-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub db_file: String,
    pub slot_prefix: String,
    pub slot_count: u32,
    pub timezone: Tz,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// development | staging | production
    pub environment: String,
    pub snapshot_channel_capacity: usize,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/bikeshop".into()),
            db_file: std::env::var("DB_FILE").unwrap_or_else(|_| "shop.redb".into()),
            slot_prefix: std::env::var("SLOT_PREFIX").unwrap_or_else(|_| "A".into()),
            slot_count: std::env::var("SLOT_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            timezone: std::env::var("BUSINESS_TZ")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(chrono_tz::Asia::Jakarta),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|v| !v.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            snapshot_channel_capacity: std::env::var("SNAPSHOT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
        }
    }

    /// Override the parts tests care about
    pub fn with_overrides(work_dir: impl Into<String>, slot_count: u32) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.slot_count = slot_count;
        config
    }

    /// Full path of the database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.db_file)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
