use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::rest::tracked;
use crate::engine::lifecycle::{self, EventKind, LifecycleEvent, NewBooking, NewPickup};
use crate::error::AppError;
use crate::models::booking::{Booking, ServiceTier};
use crate::models::package::PackageDescriptor;
use crate::models::pickup::PickupAssignment;
use crate::notify::send_best_effort;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/:no", get(get_booking))
        .route("/bookings/:no/package", put(update_package))
        .route("/bookings/:no/forward", post(forward_booking))
        .route("/bookings/:no/pickup", post(assign_pickup).put(reassign_pickup))
        .route("/bookings/:no/picked-up", post(record_pickup))
        .route("/bookings/:no/cancel", post(cancel_booking))
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewBooking>,
) -> Result<Json<Booking>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let booking = lifecycle::create_booking(payload)?;
        state.backend.insert_booking(booking.clone())?;
        Ok(booking)
    })();
    let booking = tracked(&state, "CreateBooking", start, result)?;

    state.metrics.active_bookings.inc();
    state.publish(LifecycleEvent::now(
        &booking.booking_no,
        EventKind::BookingCreated,
        booking.status,
    ));
    info!(booking_no = %booking.booking_no, amount = booking.billable_amount(), "booking created");

    Ok(Json(booking))
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(no): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.backend.load_booking(&no)?))
}

#[derive(Deserialize)]
pub struct UpdatePackageRequest {
    pub service_tier: ServiceTier,
    pub package: PackageDescriptor,
}

/// Edit tier/package on a pending booking; the amount is recomputed on every
/// edit, not just at submit.
async fn update_package(
    State(state): State<Arc<AppState>>,
    Path(no): Path<String>,
    Json(payload): Json<UpdatePackageRequest>,
) -> Result<Json<Booking>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let booking = state.backend.load_booking(&no)?;
        let updated = lifecycle::reprice(&booking, payload.service_tier, payload.package)?;
        let saved = state.backend.save_booking(updated, booking.version)?;
        Ok(saved)
    })();
    let booking = tracked(&state, "EditPackage", start, result)?;

    Ok(Json(booking))
}

#[derive(Deserialize)]
pub struct ForwardRequest {
    pub target_branch: Uuid,
}

async fn forward_booking(
    State(state): State<Arc<AppState>>,
    Path(no): Path<String>,
    Json(payload): Json<ForwardRequest>,
) -> Result<Json<Booking>, AppError> {
    let start = Instant::now();
    let result = (|| {
        state.backend.load_branch(payload.target_branch)?;
        let booking = state.backend.load_booking(&no)?;
        let (original, derived) = lifecycle::forward_to_branch(&booking, payload.target_branch)?;
        // Claim the forward on the original first; a concurrent forward
        // loses the version race and never produces a second derived booking.
        state.backend.save_booking(original, booking.version)?;
        state.backend.insert_booking(derived.clone())?;
        Ok(derived)
    })();
    let derived = tracked(&state, "ForwardToBranch", start, result)?;

    // The derived booking takes the original's slot in the open count: the
    // original is retired by the forward, so the gauge does not move.
    state.publish(LifecycleEvent::now(
        &derived.booking_no,
        EventKind::ForwardedToBranch,
        derived.status,
    ));
    info!(booking_no = %no, derived = %derived.booking_no, "booking forwarded to branch");

    Ok(Json(derived))
}

async fn assign_pickup(
    State(state): State<Arc<AppState>>,
    Path(no): Path<String>,
    Json(payload): Json<NewPickup>,
) -> Result<Json<PickupAssignment>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let booking = state.backend.load_booking(&no)?;
        let executives = state.backend.list_executives(payload.branch_id)?;
        let (updated, assignment) = lifecycle::assign_pickup(&booking, &payload, &executives)?;
        let saved = state.backend.save_booking(updated, booking.version)?;
        state.backend.save_pickup(assignment.clone())?;
        Ok((saved, assignment))
    })();
    let (booking, assignment) = tracked(&state, "AssignPickup", start, result)?;

    state.publish(LifecycleEvent::now(
        &booking.booking_no,
        EventKind::PickupAssigned,
        booking.status,
    ));
    send_best_effort(
        state.notifier.as_ref(),
        &booking,
        "your pickup has been scheduled",
    );

    Ok(Json(assignment))
}

async fn reassign_pickup(
    State(state): State<Arc<AppState>>,
    Path(no): Path<String>,
    Json(payload): Json<NewPickup>,
) -> Result<Json<PickupAssignment>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let booking = state.backend.load_booking(&no)?;
        let current = state.backend.load_pickup(&no)?;
        let executives = state.backend.list_executives(payload.branch_id)?;
        let assignment = lifecycle::reassign_pickup(&booking, current, &payload, &executives)?;
        state.backend.save_pickup(assignment.clone())?;
        Ok((booking, assignment))
    })();
    let (booking, assignment) = tracked(&state, "ReassignPickup", start, result)?;

    state.publish(LifecycleEvent::now(
        &booking.booking_no,
        EventKind::PickupReassigned,
        booking.status,
    ));

    Ok(Json(assignment))
}

async fn record_pickup(
    State(state): State<Arc<AppState>>,
    Path(no): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let booking = state.backend.load_booking(&no)?;
        let updated = lifecycle::record_pickup(&booking)?;
        let saved = state.backend.save_booking(updated, booking.version)?;
        Ok(saved)
    })();
    let booking = tracked(&state, "RecordPickup", start, result)?;

    state.publish(LifecycleEvent::now(
        &booking.booking_no,
        EventKind::PickedUp,
        booking.status,
    ));

    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(no): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let booking = state.backend.load_booking(&no)?;
        let updated = lifecycle::cancel(&booking)?;
        let saved = state.backend.save_booking(updated, booking.version)?;
        Ok(saved)
    })();
    let booking = tracked(&state, "Cancel", start, result)?;

    state.metrics.active_bookings.dec();
    state.publish(LifecycleEvent::now(
        &booking.booking_no,
        EventKind::Cancelled,
        booking.status,
    ));
    info!(booking_no = %booking.booking_no, "booking cancelled");

    Ok(Json(booking))
}
