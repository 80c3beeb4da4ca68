use appraise_core::store::ReviewListParams;
use appraise_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/appraisals/{id}/review
///
/// The appraised employee's review for this appraisal.
pub async fn get_appraisal_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(appraisal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let review = state
        .records
        .review_for_appraisal(&auth.caller(), appraisal_id)
        .await?;
    Ok(Json(DataResponse { data: review }))
}

/// GET /api/v1/reviews
///
/// Newest first; `employee_id`, `appraisal_id`, `limit` and `offset` filter
/// and page. Employees only ever see their own.
pub async fn list_reviews(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> AppResult<impl IntoResponse> {
    let reviews = state.records.list_reviews(&auth.caller(), params).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/{id}
pub async fn get_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let review = state.records.get_review(&auth.caller(), id).await?;
    Ok(Json(DataResponse { data: review }))
}
