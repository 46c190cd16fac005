//! Public storage request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Storage request submitted through the public intake form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageRequest {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub bike_model: String,
    pub duration_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: RequestStatus,
}

impl StorageRequest {
    /// Short reference printed on approval logs (last 4 chars of the id)
    pub fn short_ref(&self) -> &str {
        let start = self
            .id
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.id[start..]
    }
}
