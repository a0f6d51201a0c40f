use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A pickup or delivery party on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub phone: String,
    pub address: Address,
}

impl Party {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("party name cannot be empty".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("party phone cannot be empty".to_string());
        }
        if self.address.line1.trim().is_empty() || self.address.city.trim().is_empty() {
            return Err("address requires line1 and city".to_string());
        }
        Ok(())
    }
}
