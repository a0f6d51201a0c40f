use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::rest::tracked;
use crate::backend::BackendError;
use crate::engine::lifecycle::{self, EventKind, LifecycleError, LifecycleEvent, NewShipment};
use crate::error::AppError;
use crate::label::render_label;
use crate::models::shipment::Shipment;
use crate::notify::send_best_effort;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shipments", post(create_shipment))
        .route("/shipments/:id", get(get_shipment))
        .route("/shipments/:id/stops/:index/arrival", post(record_arrival))
        .route("/shipments/:id/stops/:index/departure", post(record_departure))
        .route("/shipments/:id/dispatch", post(dispatch))
        .route("/shipments/:id/delivered", post(mark_delivered))
        .route("/shipments/:id/label", get(get_label))
}

#[derive(Deserialize)]
pub struct CreateShipmentRequest {
    pub booking_no: String,
    #[serde(flatten)]
    pub shipment: NewShipment,
}

async fn create_shipment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateShipmentRequest>,
) -> Result<Json<Shipment>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let booking = state.backend.load_booking(&payload.booking_no)?;
        // A missing assignment is a precondition failure; transport faults
        // keep their retryable classification.
        state
            .backend
            .load_pickup(&payload.booking_no)
            .map_err(|err| match err {
                BackendError::NotFound(_) => AppError::Lifecycle(LifecycleError::Validation(
                    format!("booking {} has no pickup assignment", payload.booking_no),
                )),
                other => AppError::from(other),
            })?;

        let (updated, shipment) = lifecycle::create_shipment(&booking, payload.shipment)?;
        let saved = state.backend.save_booking(updated, booking.version)?;
        state.backend.insert_shipment(shipment.clone())?;
        Ok((saved, shipment))
    })();
    let (booking, shipment) = tracked(&state, "CreateShipment", start, result)?;

    state.publish(LifecycleEvent::now(
        &booking.booking_no,
        EventKind::ShipmentCreated,
        booking.status,
    ));
    info!(
        shipment_id = %shipment.id,
        tracking_no = %shipment.tracking_no,
        stops = shipment.stops.len(),
        "shipment created"
    );

    Ok(Json(shipment))
}

async fn get_shipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    Ok(Json(state.backend.load_shipment(id)?))
}

#[derive(Deserialize, Default)]
pub struct StopTimestampRequest {
    /// Actual time of the event; defaults to now.
    pub at: Option<DateTime<Utc>>,
}

async fn record_arrival(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<StopTimestampRequest>,
) -> Result<Json<Shipment>, AppError> {
    let start = Instant::now();
    let at = payload.at.unwrap_or_else(Utc::now);
    let result = (|| {
        let shipment = state.backend.load_shipment(id)?;
        let updated = lifecycle::record_stop_arrival(&shipment, index, at)?;
        let saved = state.backend.save_shipment(updated, shipment.version)?;
        Ok(saved)
    })();
    let shipment = tracked(&state, "RecordStopArrival", start, result)?;

    state.publish(LifecycleEvent::now(
        &shipment.booking_no,
        EventKind::StopArrival,
        crate::models::booking::BookingStatus::InTransit,
    ));

    Ok(Json(shipment))
}

async fn record_departure(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<StopTimestampRequest>,
) -> Result<Json<Shipment>, AppError> {
    let start = Instant::now();
    let at = payload.at.unwrap_or_else(Utc::now);
    let result = (|| {
        let shipment = state.backend.load_shipment(id)?;
        let updated = lifecycle::record_stop_departure(&shipment, index, at)?;
        let saved = state.backend.save_shipment(updated, shipment.version)?;
        Ok(saved)
    })();
    let shipment = tracked(&state, "RecordStopDeparture", start, result)?;

    state.publish(LifecycleEvent::now(
        &shipment.booking_no,
        EventKind::StopDeparture,
        crate::models::booking::BookingStatus::InTransit,
    ));

    Ok(Json(shipment))
}

#[derive(Deserialize)]
pub struct DispatchRequest {
    pub executive_id: Uuid,
}

/// Assign the final-mile executive and mark out for delivery in one
/// transition; a half-assigned shipment is never persisted.
async fn dispatch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DispatchRequest>,
) -> Result<Json<Shipment>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let shipment = state.backend.load_shipment(id)?;
        let booking = state.backend.load_booking(&shipment.booking_no)?;
        let executives = state.backend.list_executives(shipment.destination_branch)?;

        let (updated_booking, updated_shipment) =
            lifecycle::dispatch_for_delivery(&booking, &shipment, payload.executive_id, &executives)?;
        let saved = state.backend.save_booking(updated_booking, booking.version)?;
        let saved_shipment = state
            .backend
            .save_shipment(updated_shipment, shipment.version)?;
        Ok((saved, saved_shipment))
    })();
    let (booking, shipment) = tracked(&state, "AssignFinalExecutiveAndDispatch", start, result)?;

    state.publish(LifecycleEvent::now(
        &booking.booking_no,
        EventKind::OutForDelivery,
        booking.status,
    ));
    info!(shipment_id = %shipment.id, executive_id = ?shipment.executive_id, "shipment out for delivery");

    Ok(Json(shipment))
}

async fn mark_delivered(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    let start = Instant::now();
    let result = (|| {
        let shipment = state.backend.load_shipment(id)?;
        let booking = state.backend.load_booking(&shipment.booking_no)?;

        let (updated_booking, updated_shipment) = lifecycle::mark_delivered(&booking, &shipment)?;
        let saved = state.backend.save_booking(updated_booking, booking.version)?;
        let saved_shipment = state
            .backend
            .save_shipment(updated_shipment, shipment.version)?;
        Ok((saved, saved_shipment))
    })();
    let (booking, shipment) = tracked(&state, "MarkDelivered", start, result)?;

    state.metrics.active_bookings.dec();
    state.publish(LifecycleEvent::now(
        &booking.booking_no,
        EventKind::Delivered,
        booking.status,
    ));
    send_best_effort(
        state.notifier.as_ref(),
        &booking,
        "your package has been delivered",
    );
    info!(shipment_id = %shipment.id, "shipment delivered");

    Ok(Json(shipment))
}

async fn get_label(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<String, AppError> {
    let shipment = state.backend.load_shipment(id)?;
    let booking = state.backend.load_booking(&shipment.booking_no)?;
    Ok(render_label(&booking, &shipment))
}
