//! Handlers for appraisal records: create, read, list, edit, delete.
//!
//! None of these touch `status`; see [`super::workflow`] for transitions.

use appraise_core::appraisal::{CreateAppraisal, UpdateAppraisal};
use appraise_core::store::AppraisalListParams;
use appraise_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/appraisals
///
/// List appraisals, newest first. Employees only ever see their own.
pub async fn list_appraisals(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AppraisalListParams>,
) -> AppResult<impl IntoResponse> {
    let appraisals = state.records.list(&auth.caller(), params).await?;
    Ok(Json(DataResponse { data: appraisals }))
}

/// POST /api/v1/appraisals
///
/// Open an appraisal in `pending`. Requires HR, manager or admin.
pub async fn create_appraisal(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAppraisal>,
) -> AppResult<impl IntoResponse> {
    let appraisal = state.records.create(&auth.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: appraisal })))
}

/// GET /api/v1/appraisals/{id}
pub async fn get_appraisal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let appraisal = state.records.get(&auth.caller(), id).await?;
    Ok(Json(DataResponse { data: appraisal }))
}

/// PUT /api/v1/appraisals/{id}
///
/// Edit the cycle label or period. Requires HR or admin.
pub async fn update_appraisal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAppraisal>,
) -> AppResult<impl IntoResponse> {
    let appraisal = state.records.update_details(&auth.caller(), id, input).await?;
    Ok(Json(DataResponse { data: appraisal }))
}

/// DELETE /api/v1/appraisals/{id}
///
/// Delete an appraisal and its reviews. Requires admin.
pub async fn delete_appraisal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.records.delete(&auth.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
