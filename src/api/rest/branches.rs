use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::branch::{Branch, Executive};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/branches", post(create_branch).get(list_branches))
        .route(
            "/branches/:id/executives",
            post(create_executive).get(list_executives),
        )
}

#[derive(Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
    #[serde(default)]
    pub is_main: bool,
}

async fn create_branch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBranchRequest>,
) -> Result<Json<Branch>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Lifecycle(
            crate::engine::lifecycle::LifecycleError::Validation(
                "branch name cannot be empty".to_string(),
            ),
        ));
    }

    let branch = Branch {
        id: Uuid::new_v4(),
        name: payload.name,
        is_main: payload.is_main,
    };

    state.backend.insert_branch(branch.clone())?;
    Ok(Json(branch))
}

async fn list_branches(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Branch>>, AppError> {
    Ok(Json(state.backend.list_branches()?))
}

#[derive(Deserialize)]
pub struct CreateExecutiveRequest {
    pub name: String,
    pub phone: String,
}

async fn create_executive(
    State(state): State<Arc<AppState>>,
    Path(branch_id): Path<Uuid>,
    Json(payload): Json<CreateExecutiveRequest>,
) -> Result<Json<Executive>, AppError> {
    // Executives are always created under an existing branch.
    state.backend.load_branch(branch_id)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::Lifecycle(
            crate::engine::lifecycle::LifecycleError::Validation(
                "executive name cannot be empty".to_string(),
            ),
        ));
    }

    let executive = Executive {
        id: Uuid::new_v4(),
        branch_id,
        name: payload.name,
        phone: payload.phone,
    };

    state.backend.insert_executive(executive.clone())?;
    Ok(Json(executive))
}

async fn list_executives(
    State(state): State<Arc<AppState>>,
    Path(branch_id): Path<Uuid>,
) -> Result<Json<Vec<Executive>>, AppError> {
    state.backend.load_branch(branch_id)?;
    Ok(Json(state.backend.list_executives(branch_id)?))
}
