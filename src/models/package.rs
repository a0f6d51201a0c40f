use serde::{Deserialize, Serialize};

/// Known package categories drive the pricing multiplier. Categories outside
/// this set still price at the default multiplier so intake never blocks on
/// an unrecognized type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    Document,
    Parcel,
    Box,
    Envelope,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub weight_kg: f64,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub quantity: u32,
    pub declared_value: i64,
    pub description: String,
    pub package_type: PackageType,
}

impl PackageDescriptor {
    /// Capacity limits are not enforced today; only the fields pricing
    /// depends on are checked here.
    pub fn validate(&self) -> Result<(), String> {
        if self.weight_kg < 0.0 {
            return Err("weight cannot be negative".to_string());
        }
        if self.quantity == 0 {
            return Err("quantity must be at least 1".to_string());
        }
        if self.declared_value < 0 {
            return Err("declared value cannot be negative".to_string());
        }
        Ok(())
    }
}
