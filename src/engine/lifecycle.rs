use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::engine::routing::validate_stops;
use crate::models::booking::{
    Booking, BookingOrigin, BookingStatus, PaymentMethod, PaymentStatus, ServiceTier,
};
use crate::models::branch::Executive;
use crate::models::package::PackageDescriptor;
use crate::models::party::Party;
use crate::models::pickup::PickupAssignment;
use crate::models::shipment::{Shipment, ShipmentStatus, ShippingMethod, Stop};
use crate::pricing::compute_amount;

/// Classified failure of a lifecycle transition. Every transition validates
/// before any mutation; an error means nothing changed.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid transition: {event} not allowed while {from}")]
    InvalidTransition { event: &'static str, from: String },

    #[error("booking already forwarded")]
    AlreadyForwarded,

    #[error("stale state: aggregate was modified concurrently, reload and retry")]
    StaleState,

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl LifecycleError {
    fn invalid(event: &'static str, from: BookingStatus) -> Self {
        LifecycleError::InvalidTransition {
            event,
            from: format!("{from:?}"),
        }
    }

    fn invalid_shipment(event: &'static str, from: ShipmentStatus) -> Self {
        LifecycleError::InvalidTransition {
            event,
            from: format!("{from:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BookingCreated,
    ForwardedToBranch,
    PickupAssigned,
    PickupReassigned,
    PickedUp,
    ShipmentCreated,
    StopArrival,
    StopDeparture,
    OutForDelivery,
    Delivered,
    Cancelled,
}

/// Emitted on the broadcast channel after a transition is applied, for the
/// websocket stream and other observers.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleEvent {
    pub booking_no: String,
    pub event: EventKind,
    pub status: BookingStatus,
    pub at: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn now(booking_no: &str, event: EventKind, status: BookingStatus) -> Self {
        Self {
            booking_no: booking_no.to_string(),
            event,
            status,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub service_tier: ServiceTier,
    pub package: PackageDescriptor,
    pub pickup_party: Party,
    pub delivery_party: Party,
    pub payment_method: PaymentMethod,
    pub origin: BookingOrigin,
    pub override_amount: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPickup {
    pub branch_id: Uuid,
    pub executive_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShipment {
    pub origin_branch: Uuid,
    pub destination_branch: Uuid,
    pub stops: Vec<Stop>,
    pub shipping_method: ShippingMethod,
    pub estimated_delivery: NaiveDate,
    pub notes: Option<String>,
    pub tracking_no: Option<String>,
}

/// CreateBooking: validates parties, package and pricing, then yields a
/// pending booking. The computed amount is always retained; a manual
/// override replaces it for billing and flips the manual flag.
pub fn create_booking(req: NewBooking) -> Result<Booking, LifecycleError> {
    req.pickup_party
        .validate()
        .map_err(LifecycleError::Validation)?;
    req.delivery_party
        .validate()
        .map_err(LifecycleError::Validation)?;
    req.package.validate().map_err(LifecycleError::Validation)?;

    let computed_amount =
        compute_amount(req.service_tier, req.package.weight_kg, &req.package.package_type)?;

    if let Some(manual) = req.override_amount {
        if manual < 0 {
            return Err(LifecycleError::Validation(
                "manual amount cannot be negative".to_string(),
            ));
        }
    }

    Ok(Booking {
        booking_no: Booking::new_booking_no(),
        service_tier: req.service_tier,
        package: req.package,
        pickup_party: req.pickup_party,
        delivery_party: req.delivery_party,
        payment_method: req.payment_method,
        payment_status: PaymentStatus::Pending,
        computed_amount,
        amount_is_manual: req.override_amount.is_some(),
        override_amount: req.override_amount,
        origin: req.origin,
        forwarded_to: None,
        status: BookingStatus::Pending,
        version: 0,
        created_at: Utc::now(),
    })
}

/// Re-price a booking after editing tier/package. Pricing is recomputed on
/// every edit, not just at submit; a manual override stays authoritative for
/// billing but the computed amount is refreshed alongside it.
pub fn reprice(
    booking: &Booking,
    service_tier: ServiceTier,
    package: PackageDescriptor,
) -> Result<Booking, LifecycleError> {
    if booking.status != BookingStatus::Pending {
        return Err(LifecycleError::invalid("EditPackage", booking.status));
    }
    package.validate().map_err(LifecycleError::Validation)?;

    let computed_amount = compute_amount(service_tier, package.weight_kg, &package.package_type)?;

    let mut updated = booking.clone();
    updated.service_tier = service_tier;
    updated.package = package;
    updated.computed_amount = computed_amount;
    Ok(updated)
}

/// ForwardToBranch: converts an externally-sourced booking into a
/// branch-owned one. One-time and one-directional; the derived booking gets
/// a fresh booking number and starts pending under the target branch.
pub fn forward_to_branch(
    booking: &Booking,
    target_branch: Uuid,
) -> Result<(Booking, Booking), LifecycleError> {
    if !booking.is_external() {
        return Err(LifecycleError::Validation(
            "only external-origin bookings can be forwarded".to_string(),
        ));
    }
    if booking.forwarded_to.is_some() {
        return Err(LifecycleError::AlreadyForwarded);
    }

    let derived = Booking {
        booking_no: Booking::new_booking_no(),
        origin: BookingOrigin::Branch {
            branch_id: target_branch,
        },
        forwarded_to: None,
        status: BookingStatus::Pending,
        version: 0,
        created_at: Utc::now(),
        ..booking.clone()
    };

    let mut original = booking.clone();
    original.forwarded_to = Some(derived.booking_no.clone());

    Ok((original, derived))
}

fn require_executive_in_branch(
    executive_id: Uuid,
    branch_id: Uuid,
    branch_executives: &[Executive],
) -> Result<(), LifecycleError> {
    let belongs = branch_executives
        .iter()
        .any(|fe| fe.id == executive_id && fe.branch_id == branch_id);
    if belongs {
        Ok(())
    } else {
        Err(LifecycleError::Validation(format!(
            "executive {executive_id} does not belong to branch {branch_id}"
        )))
    }
}

fn build_assignment(booking_no: &str, req: &NewPickup) -> PickupAssignment {
    PickupAssignment {
        booking_no: booking_no.to_string(),
        branch_id: req.branch_id,
        executive_id: req.executive_id,
        scheduled_date: req.scheduled_date,
        window_start: req.window_start,
        window_end: req.window_end,
        notes: req.notes.clone(),
        assigned_at: Utc::now(),
        history: Vec::new(),
    }
}

/// AssignPickup: pending bookings only. The executive set is re-verified at
/// transition time against the branch table, never trusted from a cache.
pub fn assign_pickup(
    booking: &Booking,
    req: &NewPickup,
    branch_executives: &[Executive],
) -> Result<(Booking, PickupAssignment), LifecycleError> {
    if booking.status != BookingStatus::Pending {
        return Err(LifecycleError::invalid("AssignPickup", booking.status));
    }
    if req.window_end < req.window_start {
        return Err(LifecycleError::Validation(
            "pickup window end precedes start".to_string(),
        ));
    }
    require_executive_in_branch(req.executive_id, req.branch_id, branch_executives)?;

    let mut updated = booking.clone();
    updated.status = BookingStatus::FeAssigned;

    Ok((updated, build_assignment(&booking.booking_no, req)))
}

/// ReassignPickup: overwrite the executive/schedule of an already assigned
/// booking. Status stays fe_assigned; the prior assignment is kept as audit.
pub fn reassign_pickup(
    booking: &Booking,
    current: PickupAssignment,
    req: &NewPickup,
    branch_executives: &[Executive],
) -> Result<PickupAssignment, LifecycleError> {
    if booking.status != BookingStatus::FeAssigned {
        return Err(LifecycleError::invalid("ReassignPickup", booking.status));
    }
    if req.window_end < req.window_start {
        return Err(LifecycleError::Validation(
            "pickup window end precedes start".to_string(),
        ));
    }
    require_executive_in_branch(req.executive_id, req.branch_id, branch_executives)?;

    Ok(current.superseded_by(build_assignment(&booking.booking_no, req)))
}

/// RecordPickup: the field executive has collected the package.
pub fn record_pickup(booking: &Booking) -> Result<Booking, LifecycleError> {
    if booking.status != BookingStatus::FeAssigned {
        return Err(LifecycleError::invalid("RecordPickup", booking.status));
    }
    let mut updated = booking.clone();
    updated.status = BookingStatus::PickedUp;
    Ok(updated)
}

/// CreateShipment: validates the routing plan and moves the booking into
/// transit. The shipment itself starts pending and tracks stop progress.
pub fn create_shipment(
    booking: &Booking,
    req: NewShipment,
) -> Result<(Booking, Shipment), LifecycleError> {
    if !matches!(
        booking.status,
        BookingStatus::FeAssigned | BookingStatus::PickedUp
    ) {
        return Err(LifecycleError::invalid("CreateShipment", booking.status));
    }
    validate_stops(&req.stops, req.destination_branch)?;

    let shipment = Shipment {
        id: Uuid::new_v4(),
        tracking_no: req
            .tracking_no
            .unwrap_or_else(|| booking.booking_no.clone()),
        booking_no: booking.booking_no.clone(),
        origin_branch: req.origin_branch,
        destination_branch: req.destination_branch,
        stops: req.stops,
        current_stop: 0,
        shipping_method: req.shipping_method,
        estimated_delivery: req.estimated_delivery,
        notes: req.notes,
        executive_id: None,
        status: ShipmentStatus::Pending,
        version: 0,
        created_at: Utc::now(),
    };

    let mut updated = booking.clone();
    updated.status = BookingStatus::InTransit;

    Ok((updated, shipment))
}

fn require_current_stop(
    shipment: &Shipment,
    index: usize,
    event: &'static str,
) -> Result<(), LifecycleError> {
    if shipment.status != ShipmentStatus::Pending {
        return Err(LifecycleError::invalid_shipment(event, shipment.status));
    }
    if index >= shipment.stops.len() {
        return Err(LifecycleError::Validation(format!(
            "stop index {index} out of range ({} stops)",
            shipment.stops.len()
        )));
    }
    if index != shipment.current_stop {
        // Departed stops are frozen history; future stops are out of order.
        return Err(LifecycleError::InvalidTransition {
            event,
            from: format!("stop {} of {}", shipment.current_stop, shipment.stops.len()),
        });
    }
    Ok(())
}

/// RecordStopArrival: actual arrival at the current stop. Does not touch the
/// booking status.
pub fn record_stop_arrival(
    shipment: &Shipment,
    index: usize,
    at: DateTime<Utc>,
) -> Result<Shipment, LifecycleError> {
    require_current_stop(shipment, index, "RecordStopArrival")?;

    let mut updated = shipment.clone();
    updated.stops[index].arrival = at;
    if updated.stops[index].departure < at {
        // Keep the stop internally consistent until departure is recorded.
        updated.stops[index].departure = at;
    }
    Ok(updated)
}

/// RecordStopDeparture: closes out the current stop and advances the cursor.
pub fn record_stop_departure(
    shipment: &Shipment,
    index: usize,
    at: DateTime<Utc>,
) -> Result<Shipment, LifecycleError> {
    require_current_stop(shipment, index, "RecordStopDeparture")?;
    if at < shipment.stops[index].arrival {
        return Err(LifecycleError::Validation(
            "departure precedes arrival".to_string(),
        ));
    }

    let mut updated = shipment.clone();
    updated.stops[index].departure = at;
    updated.current_stop += 1;
    Ok(updated)
}

/// AssignFinalExecutiveAndDispatch: one atomic transition. A shipment that
/// has cleared all waypoints and has no executive yet gains one and goes
/// out for delivery; a half-assigned shipment is not a valid resting state.
pub fn dispatch_for_delivery(
    booking: &Booking,
    shipment: &Shipment,
    executive_id: Uuid,
    destination_executives: &[Executive],
) -> Result<(Booking, Shipment), LifecycleError> {
    if shipment.status != ShipmentStatus::Pending {
        return Err(LifecycleError::invalid_shipment(
            "AssignFinalExecutiveAndDispatch",
            shipment.status,
        ));
    }
    if !shipment.at_destination() {
        return Err(LifecycleError::InvalidTransition {
            event: "AssignFinalExecutiveAndDispatch",
            from: format!(
                "stop {} of {}",
                shipment.current_stop,
                shipment.stops.len()
            ),
        });
    }
    if shipment.executive_id.is_some() {
        return Err(LifecycleError::invalid_shipment(
            "AssignFinalExecutiveAndDispatch",
            shipment.status,
        ));
    }
    require_executive_in_branch(
        executive_id,
        shipment.destination_branch,
        destination_executives,
    )?;

    let mut updated_shipment = shipment.clone();
    updated_shipment.executive_id = Some(executive_id);
    updated_shipment.status = ShipmentStatus::OutForDelivery;

    let mut updated_booking = booking.clone();
    updated_booking.status = BookingStatus::OutForDelivery;

    Ok((updated_booking, updated_shipment))
}

/// MarkDelivered: terminal happy path for booking and shipment.
pub fn mark_delivered(
    booking: &Booking,
    shipment: &Shipment,
) -> Result<(Booking, Shipment), LifecycleError> {
    if shipment.status != ShipmentStatus::OutForDelivery {
        return Err(LifecycleError::invalid_shipment(
            "MarkDelivered",
            shipment.status,
        ));
    }

    let mut updated_shipment = shipment.clone();
    updated_shipment.status = ShipmentStatus::Delivered;

    let mut updated_booking = booking.clone();
    updated_booking.status = BookingStatus::Delivered;

    Ok((updated_booking, updated_shipment))
}

/// Cancel: only before pickup happens. Terminal; a cancelled booking accepts
/// no further transitions. Once a shipment exists the cancel is rejected,
/// never silently ignored.
pub fn cancel(booking: &Booking) -> Result<Booking, LifecycleError> {
    if !matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::FeAssigned
    ) {
        return Err(LifecycleError::invalid("Cancel", booking.status));
    }
    let mut updated = booking.clone();
    updated.status = BookingStatus::Cancelled;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::models::package::PackageType;
    use crate::models::party::{Address, Party};

    fn party(name: &str) -> Party {
        Party {
            name: name.to_string(),
            phone: "555-0101".to_string(),
            address: Address {
                line1: "1 Depot Way".to_string(),
                line2: None,
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                postal_code: "62701".to_string(),
            },
        }
    }

    fn package(weight_kg: f64) -> PackageDescriptor {
        PackageDescriptor {
            weight_kg,
            length_cm: 30.0,
            width_cm: 20.0,
            height_cm: 10.0,
            quantity: 1,
            declared_value: 500,
            description: "paperwork".to_string(),
            package_type: PackageType::Document,
        }
    }

    fn new_booking(origin: BookingOrigin) -> Booking {
        create_booking(NewBooking {
            service_tier: ServiceTier::Standard,
            package: package(2.0),
            pickup_party: party("sender"),
            delivery_party: party("receiver"),
            payment_method: PaymentMethod::Cash,
            origin,
            override_amount: None,
        })
        .unwrap()
    }

    fn branch_booking() -> Booking {
        new_booking(BookingOrigin::Branch {
            branch_id: Uuid::from_u128(1),
        })
    }

    fn executive(id_seed: u128, branch_seed: u128) -> Executive {
        Executive {
            id: Uuid::from_u128(id_seed),
            branch_id: Uuid::from_u128(branch_seed),
            name: "fe".to_string(),
            phone: "555-0199".to_string(),
        }
    }

    fn pickup_req(branch_seed: u128, executive_seed: u128) -> NewPickup {
        NewPickup {
            branch_id: Uuid::from_u128(branch_seed),
            executive_id: Uuid::from_u128(executive_seed),
            scheduled_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            window_start: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            window_end: chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            notes: None,
        }
    }

    fn stop(branch_seed: u128, arrive_h: u32, depart_h: u32) -> Stop {
        Stop {
            branch_id: Uuid::from_u128(branch_seed),
            arrival: Utc.with_ymd_and_hms(2025, 3, 15, arrive_h, 0, 0).unwrap(),
            departure: Utc.with_ymd_and_hms(2025, 3, 15, depart_h, 0, 0).unwrap(),
        }
    }

    fn shipment_req(stops: Vec<Stop>, destination_seed: u128) -> NewShipment {
        NewShipment {
            origin_branch: Uuid::from_u128(1),
            destination_branch: Uuid::from_u128(destination_seed),
            stops,
            shipping_method: ShippingMethod::Standard,
            estimated_delivery: chrono::NaiveDate::from_ymd_opt(2025, 3, 18).unwrap(),
            notes: None,
            tracking_no: None,
        }
    }

    fn with_status(status: BookingStatus) -> Booking {
        let mut booking = branch_booking();
        booking.status = status;
        booking
    }

    #[test]
    fn create_booking_starts_pending_with_computed_amount() {
        let booking = branch_booking();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.computed_amount, 120);
        assert!(!booking.amount_is_manual);
        assert_eq!(booking.billable_amount(), 120);
    }

    #[test]
    fn manual_override_is_billable_but_computed_is_retained() {
        let booking = create_booking(NewBooking {
            service_tier: ServiceTier::Standard,
            package: package(2.0),
            pickup_party: party("sender"),
            delivery_party: party("receiver"),
            payment_method: PaymentMethod::Card,
            origin: BookingOrigin::Branch {
                branch_id: Uuid::from_u128(1),
            },
            override_amount: Some(90),
        })
        .unwrap();

        assert!(booking.amount_is_manual);
        assert_eq!(booking.billable_amount(), 90);
        assert_eq!(booking.computed_amount, 120);
    }

    #[test]
    fn assign_pickup_requires_pending() {
        let executives = vec![executive(7, 1)];
        let booking = with_status(BookingStatus::FeAssigned);

        let result = assign_pickup(&booking, &pickup_req(1, 7), &executives);
        assert!(matches!(
            result,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn assign_pickup_rejects_executive_from_other_branch() {
        let executives = vec![executive(7, 2)];
        let booking = branch_booking();

        let result = assign_pickup(&booking, &pickup_req(1, 7), &executives);
        assert!(matches!(result, Err(LifecycleError::Validation(_))));
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn reassign_keeps_status_and_records_audit() {
        let executives = vec![executive(7, 1), executive(8, 1)];
        let booking = branch_booking();

        let (booking, first) = assign_pickup(&booking, &pickup_req(1, 7), &executives).unwrap();
        assert_eq!(booking.status, BookingStatus::FeAssigned);

        let second = reassign_pickup(&booking, first, &pickup_req(1, 8), &executives).unwrap();
        assert_eq!(second.executive_id, Uuid::from_u128(8));
        assert_eq!(second.history.len(), 1);
        assert_eq!(second.history[0].executive_id, Uuid::from_u128(7));
    }

    #[test]
    fn forward_is_one_time_only() {
        let booking = new_booking(BookingOrigin::External {
            source: "marketplace".to_string(),
        });

        let (original, derived) = forward_to_branch(&booking, Uuid::from_u128(3)).unwrap();
        assert_eq!(original.forwarded_to.as_deref(), Some(derived.booking_no.as_str()));
        assert_ne!(original.booking_no, derived.booking_no);
        assert_eq!(derived.status, BookingStatus::Pending);

        let repeat = forward_to_branch(&original, Uuid::from_u128(4));
        assert!(matches!(repeat, Err(LifecycleError::AlreadyForwarded)));
    }

    #[test]
    fn forward_rejects_branch_origin_booking() {
        let booking = branch_booking();
        let result = forward_to_branch(&booking, Uuid::from_u128(3));
        assert!(matches!(result, Err(LifecycleError::Validation(_))));
    }

    #[test]
    fn cancel_boundary_over_all_statuses() {
        let accepted = [BookingStatus::Pending, BookingStatus::FeAssigned];
        let rejected = [
            BookingStatus::PickedUp,
            BookingStatus::InTransit,
            BookingStatus::OutForDelivery,
            BookingStatus::Delivered,
            BookingStatus::Cancelled,
        ];

        for status in accepted {
            let booking = with_status(status);
            let cancelled = cancel(&booking).unwrap();
            assert_eq!(cancelled.status, BookingStatus::Cancelled);
        }
        for status in rejected {
            let booking = with_status(status);
            let result = cancel(&booking);
            assert!(
                matches!(result, Err(LifecycleError::InvalidTransition { .. })),
                "cancel must be rejected while {status:?}"
            );
        }
    }

    #[test]
    fn create_shipment_rejects_bad_stop_plan_without_side_effects() {
        let booking = with_status(BookingStatus::FeAssigned);
        // Second stop arrives at 13:00 but departs at 12:00.
        let req = shipment_req(vec![stop(10, 10, 11), stop(11, 13, 12)], 20);

        let result = create_shipment(&booking, req);
        assert!(matches!(result, Err(LifecycleError::Validation(_))));
        assert_eq!(booking.status, BookingStatus::FeAssigned);
    }

    #[test]
    fn create_shipment_moves_booking_in_transit() {
        let booking = with_status(BookingStatus::PickedUp);
        let req = shipment_req(vec![stop(10, 10, 11), stop(11, 13, 14)], 20);

        let (booking, shipment) = create_shipment(&booking, req).unwrap();
        assert_eq!(booking.status, BookingStatus::InTransit);
        assert_eq!(shipment.status, ShipmentStatus::Pending);
        assert_eq!(shipment.tracking_no, booking.booking_no);
        assert_eq!(shipment.current_stop, 0);
    }

    #[test]
    fn stop_recording_advances_cursor_and_freezes_history() {
        let booking = with_status(BookingStatus::PickedUp);
        let (_, shipment) =
            create_shipment(&booking, shipment_req(vec![stop(10, 10, 11), stop(11, 13, 14)], 20))
                .unwrap();

        let t_arrive = Utc.with_ymd_and_hms(2025, 3, 15, 10, 5, 0).unwrap();
        let t_depart = Utc.with_ymd_and_hms(2025, 3, 15, 11, 20, 0).unwrap();

        let shipment = record_stop_arrival(&shipment, 0, t_arrive).unwrap();
        let shipment = record_stop_departure(&shipment, 0, t_depart).unwrap();
        assert_eq!(shipment.current_stop, 1);

        // Stop 0 has departed and is frozen.
        let frozen = record_stop_arrival(&shipment, 0, t_arrive);
        assert!(matches!(
            frozen,
            Err(LifecycleError::InvalidTransition { .. })
        ));

        // Index past the plan is malformed input, not an ordering problem.
        let out_of_range = record_stop_arrival(&shipment, 5, t_arrive);
        assert!(matches!(out_of_range, Err(LifecycleError::Validation(_))));
    }

    #[test]
    fn departure_before_arrival_is_rejected() {
        let booking = with_status(BookingStatus::PickedUp);
        let (_, shipment) =
            create_shipment(&booking, shipment_req(vec![stop(10, 10, 11)], 20)).unwrap();

        let t_arrive = Utc.with_ymd_and_hms(2025, 3, 15, 10, 30, 0).unwrap();
        let shipment = record_stop_arrival(&shipment, 0, t_arrive).unwrap();

        let early = Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap();
        let result = record_stop_departure(&shipment, 0, early);
        assert!(matches!(result, Err(LifecycleError::Validation(_))));
    }

    #[test]
    fn dispatch_requires_all_stops_cleared() {
        let booking = with_status(BookingStatus::PickedUp);
        let (booking, shipment) =
            create_shipment(&booking, shipment_req(vec![stop(10, 10, 11)], 20)).unwrap();
        let executives = vec![executive(9, 20)];

        let early = dispatch_for_delivery(&booking, &shipment, Uuid::from_u128(9), &executives);
        assert!(matches!(
            early,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn delivery_sequence_never_skips_out_for_delivery() {
        let booking = with_status(BookingStatus::PickedUp);
        let (booking, shipment) =
            create_shipment(&booking, shipment_req(vec![stop(10, 10, 11)], 20)).unwrap();
        let executives = vec![executive(9, 20)];

        // Delivered straight from pending is not reachable.
        let skip = mark_delivered(&booking, &shipment);
        assert!(matches!(skip, Err(LifecycleError::InvalidTransition { .. })));

        let shipment = record_stop_departure(
            &shipment,
            0,
            Utc.with_ymd_and_hms(2025, 3, 15, 11, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(shipment.at_destination());

        let (booking, shipment) =
            dispatch_for_delivery(&booking, &shipment, Uuid::from_u128(9), &executives).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::OutForDelivery);
        assert_eq!(booking.status, BookingStatus::OutForDelivery);
        assert_eq!(shipment.executive_id, Some(Uuid::from_u128(9)));

        // Dispatch is not repeatable once an executive is aboard.
        let again = dispatch_for_delivery(&booking, &shipment, Uuid::from_u128(9), &executives);
        assert!(matches!(
            again,
            Err(LifecycleError::InvalidTransition { .. })
        ));

        let (booking, shipment) = mark_delivered(&booking, &shipment).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::Delivered);
        assert_eq!(booking.status, BookingStatus::Delivered);

        let repeat = mark_delivered(&booking, &shipment);
        assert!(matches!(
            repeat,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn reprice_refreshes_computed_amount_only_while_pending() {
        let booking = branch_booking();
        let updated = reprice(&booking, ServiceTier::Express, package(5.0)).unwrap();
        assert_eq!(updated.computed_amount, 250);

        let assigned = with_status(BookingStatus::FeAssigned);
        let result = reprice(&assigned, ServiceTier::Express, package(5.0));
        assert!(matches!(
            result,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }
}
