use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::branch::{Branch, Executive};
use crate::models::pickup::PickupAssignment;
use crate::models::shipment::Shipment;

/// Failures from the persistence collaborator. Transport failures surface to
/// callers as retryable 503s; they are never treated as success.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} not found")]
    NotFound(String),

    /// Compare-and-swap miss on a booking version. Two concurrent
    /// transitions against one booking: the loser gets this, not an
    /// overwrite.
    #[error("version conflict")]
    VersionConflict,

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Persistence seam for the lifecycle. The engine itself never touches
/// storage; handlers load aggregates, run the pure transition, and save
/// through here.
pub trait Backend: Send + Sync {
    fn insert_booking(&self, booking: Booking) -> Result<(), BackendError>;
    fn load_booking(&self, booking_no: &str) -> Result<Booking, BackendError>;
    /// Saves iff the stored version still matches `expected_version`, then
    /// bumps the version. Returns the stored booking.
    fn save_booking(&self, booking: Booking, expected_version: u64)
        -> Result<Booking, BackendError>;

    fn load_pickup(&self, booking_no: &str) -> Result<PickupAssignment, BackendError>;
    fn save_pickup(&self, assignment: PickupAssignment) -> Result<(), BackendError>;

    fn insert_shipment(&self, shipment: Shipment) -> Result<(), BackendError>;
    fn load_shipment(&self, id: Uuid) -> Result<Shipment, BackendError>;
    /// Saves iff the stored version still matches `expected_version`, then
    /// bumps the version. Same contract as `save_booking`; the shipment is
    /// an aggregate of its own and stop recording must not last-write-win.
    fn save_shipment(
        &self,
        shipment: Shipment,
        expected_version: u64,
    ) -> Result<Shipment, BackendError>;

    fn insert_branch(&self, branch: Branch) -> Result<(), BackendError>;
    fn load_branch(&self, id: Uuid) -> Result<Branch, BackendError>;
    fn list_branches(&self) -> Result<Vec<Branch>, BackendError>;

    fn insert_executive(&self, executive: Executive) -> Result<(), BackendError>;
    fn list_executives(&self, branch_id: Uuid) -> Result<Vec<Executive>, BackendError>;

    fn stats(&self) -> BackendStats;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BackendStats {
    pub bookings: usize,
    pub shipments: usize,
    pub branches: usize,
}

/// DashMap-backed store. The shipped default; a real deployment would put a
/// database behind the same trait.
#[derive(Default)]
pub struct InMemoryBackend {
    bookings: DashMap<String, Booking>,
    pickups: DashMap<String, PickupAssignment>,
    shipments: DashMap<Uuid, Shipment>,
    branches: DashMap<Uuid, Branch>,
    executives: DashMap<Uuid, Executive>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for InMemoryBackend {
    fn insert_booking(&self, booking: Booking) -> Result<(), BackendError> {
        self.bookings.insert(booking.booking_no.clone(), booking);
        Ok(())
    }

    fn load_booking(&self, booking_no: &str) -> Result<Booking, BackendError> {
        self.bookings
            .get(booking_no)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BackendError::NotFound(format!("booking {booking_no}")))
    }

    fn save_booking(
        &self,
        mut booking: Booking,
        expected_version: u64,
    ) -> Result<Booking, BackendError> {
        let mut entry = self
            .bookings
            .get_mut(&booking.booking_no)
            .ok_or_else(|| BackendError::NotFound(format!("booking {}", booking.booking_no)))?;

        if entry.version != expected_version {
            return Err(BackendError::VersionConflict);
        }

        booking.version = expected_version + 1;
        *entry = booking.clone();
        Ok(booking)
    }

    fn load_pickup(&self, booking_no: &str) -> Result<PickupAssignment, BackendError> {
        self.pickups
            .get(booking_no)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BackendError::NotFound(format!("pickup for booking {booking_no}")))
    }

    fn save_pickup(&self, assignment: PickupAssignment) -> Result<(), BackendError> {
        self.pickups
            .insert(assignment.booking_no.clone(), assignment);
        Ok(())
    }

    fn load_shipment(&self, id: Uuid) -> Result<Shipment, BackendError> {
        self.shipments
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BackendError::NotFound(format!("shipment {id}")))
    }

    fn insert_shipment(&self, shipment: Shipment) -> Result<(), BackendError> {
        self.shipments.insert(shipment.id, shipment);
        Ok(())
    }

    fn save_shipment(
        &self,
        mut shipment: Shipment,
        expected_version: u64,
    ) -> Result<Shipment, BackendError> {
        let mut entry = self
            .shipments
            .get_mut(&shipment.id)
            .ok_or_else(|| BackendError::NotFound(format!("shipment {}", shipment.id)))?;

        if entry.version != expected_version {
            return Err(BackendError::VersionConflict);
        }

        shipment.version = expected_version + 1;
        *entry = shipment.clone();
        Ok(shipment)
    }

    fn insert_branch(&self, branch: Branch) -> Result<(), BackendError> {
        self.branches.insert(branch.id, branch);
        Ok(())
    }

    fn load_branch(&self, id: Uuid) -> Result<Branch, BackendError> {
        self.branches
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BackendError::NotFound(format!("branch {id}")))
    }

    fn list_branches(&self) -> Result<Vec<Branch>, BackendError> {
        Ok(self
            .branches
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn insert_executive(&self, executive: Executive) -> Result<(), BackendError> {
        self.executives.insert(executive.id, executive);
        Ok(())
    }

    fn list_executives(&self, branch_id: Uuid) -> Result<Vec<Executive>, BackendError> {
        Ok(self
            .executives
            .iter()
            .filter(|entry| entry.value().branch_id == branch_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn stats(&self) -> BackendStats {
        BackendStats {
            bookings: self.bookings.len(),
            shipments: self.shipments.len(),
            branches: self.branches.len(),
        }
    }
}
