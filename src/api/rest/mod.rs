pub mod bookings;
pub mod branches;
pub mod shipments;
pub mod ws;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(bookings::router())
        .merge(shipments::router())
        .merge(branches::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Record transition outcome and latency, passing the result through.
pub(crate) fn tracked<T>(
    state: &AppState,
    event: &'static str,
    start: Instant,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .record(event, outcome, start.elapsed().as_secs_f64());
    result
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    bookings: usize,
    shipments: usize,
    branches: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.backend.stats();
    Json(HealthResponse {
        status: "ok",
        bookings: stats.bookings,
        shipments: stats.shipments,
        branches: stats.branches,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
