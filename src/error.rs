use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::engine::lifecycle::LifecycleError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(what) => AppError::NotFound(what),
            BackendError::VersionConflict => AppError::Lifecycle(LifecycleError::StaleState),
            BackendError::Transport(msg) => {
                AppError::Lifecycle(LifecycleError::BackendUnavailable(msg))
            }
        }
    }
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Lifecycle(LifecycleError::Validation(_)) => "validation",
            AppError::Lifecycle(LifecycleError::InvalidTransition { .. }) => "invalid_transition",
            AppError::Lifecycle(LifecycleError::AlreadyForwarded) => "already_forwarded",
            AppError::Lifecycle(LifecycleError::StaleState) => "stale_state",
            AppError::Lifecycle(LifecycleError::BackendUnavailable(_)) => "backend_unavailable",
            AppError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Lifecycle(LifecycleError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Lifecycle(LifecycleError::InvalidTransition { .. })
            | AppError::Lifecycle(LifecycleError::AlreadyForwarded)
            | AppError::Lifecycle(LifecycleError::StaleState) => StatusCode::CONFLICT,
            AppError::Lifecycle(LifecycleError::BackendUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (self.status(), body).into_response()
    }
}
