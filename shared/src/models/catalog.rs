//! Per-branch catalog definitions (mechanics, services)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MechanicDefinition {
    pub id: String,
    pub name: String,
    /// Branch codes this mechanic works at
    #[serde(default)]
    pub branches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub id: String,
    pub name: String,
    /// Branch codes offering this service
    #[serde(default)]
    pub branches: Vec<String>,
}

/// Default services seeded into an empty store
pub const DEFAULT_SERVICES: &[&str] = &[
    "Full Bike Spa",
    "Drivetrain Cleaning",
    "Wheel Truing",
    "Build & Setup",
    "Brake Bleeding",
    "Bottom Bracket Service",
];

/// Default mechanics seeded into an empty store
pub const DEFAULT_MECHANICS: &[&str] = &["Andi", "Wahyu", "Arif"];
