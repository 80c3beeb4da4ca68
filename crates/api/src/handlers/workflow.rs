//! Handlers for appraisal lifecycle transitions.
//!
//! Every handler here delegates to [`LifecycleEngine`](appraise_core::lifecycle::LifecycleEngine),
//! the only code path allowed to change an appraisal's status.

use appraise_core::appraisal::{FinalizeRequest, StatusUpdateRequest};
use appraise_core::review::{ManagerReviewRequest, SelfReviewRequest};
use appraise_core::status::AppraisalStatus;
use appraise_core::types::DbId;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Statuses the caller may move an appraisal to.
#[derive(Debug, Serialize)]
pub struct PermittedTransitions {
    pub appraisal_id: DbId,
    pub targets: Vec<AppraisalStatus>,
}

/// POST /api/v1/appraisals/{id}/self-review
pub async fn submit_self_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SelfReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let review = state
        .engine
        .submit_self_review(id, &auth.caller(), input)
        .await?;
    Ok(Json(DataResponse { data: review }))
}

/// POST /api/v1/appraisals/{id}/manager-review
pub async fn submit_manager_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ManagerReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let review = state
        .engine
        .submit_manager_review(id, &auth.caller(), input)
        .await?;
    Ok(Json(DataResponse { data: review }))
}

/// POST /api/v1/appraisals/{id}/finalize
pub async fn finalize_appraisal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<FinalizeRequest>,
) -> AppResult<impl IntoResponse> {
    let appraisal = state
        .engine
        .finalize_appraisal(id, &auth.caller(), input)
        .await?;
    Ok(Json(DataResponse { data: appraisal }))
}

/// PUT /api/v1/appraisals/{id}/status
///
/// Explicit status change, checked against the transition table. Writes no
/// review content.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StatusUpdateRequest>,
) -> AppResult<impl IntoResponse> {
    let appraisal = state
        .engine
        .update_status(id, &auth.caller(), &input.status)
        .await?;
    Ok(Json(DataResponse { data: appraisal }))
}

/// GET /api/v1/appraisals/{id}/transitions
pub async fn list_transitions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let targets = state.engine.permitted_transitions(id, &auth.caller()).await?;
    Ok(Json(DataResponse {
        data: PermittedTransitions {
            appraisal_id: id,
            targets,
        },
    }))
}
