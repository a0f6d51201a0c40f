use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical office in the courier network. Branches own bookings and
/// executives and act as routing waypoints/destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub is_main: bool,
}

/// A branch-scoped agent who performs physical pickup or delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Executive {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub phone: String,
}
