use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Standard,
    Express,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    OutForDelivery,
    Delivered,
}

/// A scheduled arrival/departure at an intermediate branch. The final
/// destination is never a stop; destination arrival is modeled as clearing
/// the end of the stop list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub branch_id: Uuid,
    pub arrival: DateTime<Utc>,
    pub departure: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    /// Defaults to the booking number at creation.
    pub tracking_no: String,
    pub booking_no: String,
    pub origin_branch: Uuid,
    pub destination_branch: Uuid,
    pub stops: Vec<Stop>,
    /// Index of the next stop not yet departed. Stops below this index are
    /// frozen history; `current_stop == stops.len()` means the shipment has
    /// cleared its waypoints and sits at the destination branch.
    pub current_stop: usize,
    pub shipping_method: ShippingMethod,
    pub estimated_delivery: NaiveDate,
    pub notes: Option<String>,
    pub executive_id: Option<Uuid>,
    pub status: ShipmentStatus,
    /// Optimistic-concurrency token, bumped on every successful save.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Shipment {
    pub fn at_destination(&self) -> bool {
        self.current_stop == self.stops.len()
    }
}
