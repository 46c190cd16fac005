//! Customer model

use serde::{Deserialize, Serialize};

/// Customer record, deduplicated by phone + case-folded name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    /// Known bike models, insertion order preserved, no duplicates
    #[serde(default)]
    pub bikes: Vec<String>,
}

impl Customer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            bikes: Vec::new(),
        }
    }

    /// Append a bike model if not already known. Returns true when added.
    pub fn add_bike(&mut self, model: &str) -> bool {
        let model = model.trim();
        if model.is_empty() || self.bikes.iter().any(|b| b == model) {
            return false;
        }
        self.bikes.push(model.to_string());
        true
    }

    /// Case-insensitive name comparison used by dedup
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_bike_suppresses_duplicates() {
        let mut c = Customer::new("CUST-1", "Alice", "0812");
        assert!(c.add_bike("Brompton"));
        assert!(c.add_bike("Tarmac SL7"));
        assert!(!c.add_bike("Brompton"));
        assert!(!c.add_bike("  "));
        assert_eq!(c.bikes, vec!["Brompton", "Tarmac SL7"]);
    }

    #[test]
    fn name_match_ignores_case_and_padding() {
        let c = Customer::new("CUST-1", "Alice Wong", "0812");
        assert!(c.name_matches(" alice WONG"));
        assert!(!c.name_matches("Alicia Wong"));
    }
}
