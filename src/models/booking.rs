use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::package::PackageDescriptor;
use crate::models::party::Party;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTier {
    Standard,
    Express,
    SameDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// Closed booking status set. Unrecognized strings fail deserialization at
/// the API boundary instead of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    FeAssigned,
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
    Cancelled,
}

/// Who placed the booking: a branch in the network, or an external intake
/// channel (marketplace, web form) that must be forwarded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingOrigin {
    Branch { branch_id: Uuid },
    External { source: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Stable external tracking key, assigned once at creation.
    pub booking_no: String,
    pub service_tier: ServiceTier,
    pub package: PackageDescriptor,
    pub pickup_party: Party,
    pub delivery_party: Party,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// System-computed amount, always retained for audit even when an
    /// override is in effect.
    pub computed_amount: i64,
    pub override_amount: Option<i64>,
    pub amount_is_manual: bool,
    pub origin: BookingOrigin,
    /// Set once by forwarding; a forwarded booking can never forward again.
    pub forwarded_to: Option<String>,
    pub status: BookingStatus,
    /// Optimistic-concurrency token, bumped on every successful save.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new_booking_no() -> String {
        format!("BK-{}", Uuid::new_v4().simple())
    }

    /// The amount billed to the customer: manual override when present,
    /// otherwise the computed amount.
    pub fn billable_amount(&self) -> i64 {
        self.override_amount.unwrap_or(self.computed_amount)
    }

    pub fn is_external(&self) -> bool {
        matches!(self.origin, BookingOrigin::External { .. })
    }
}
