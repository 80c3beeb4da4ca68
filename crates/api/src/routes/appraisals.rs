use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{appraisals, reviews, workflow};
use crate::state::AppState;

/// Appraisal routes, nested under `/appraisals`.
///
/// ```text
/// GET    /                          list_appraisals
/// POST   /                          create_appraisal
/// GET    /{id}                      get_appraisal
/// PUT    /{id}                      update_appraisal
/// DELETE /{id}                      delete_appraisal
/// PUT    /{id}/status               update_status
/// POST   /{id}/self-review          submit_self_review
/// POST   /{id}/manager-review       submit_manager_review
/// POST   /{id}/finalize             finalize_appraisal
/// GET    /{id}/review               get_appraisal_review
/// GET    /{id}/transitions          list_transitions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(appraisals::list_appraisals).post(appraisals::create_appraisal),
        )
        .route(
            "/{id}",
            get(appraisals::get_appraisal)
                .put(appraisals::update_appraisal)
                .delete(appraisals::delete_appraisal),
        )
        .route("/{id}/status", put(workflow::update_status))
        .route("/{id}/self-review", post(workflow::submit_self_review))
        .route("/{id}/manager-review", post(workflow::submit_manager_review))
        .route("/{id}/finalize", post(workflow::finalize_appraisal))
        .route("/{id}/review", get(reviews::get_appraisal_review))
        .route("/{id}/transitions", get(workflow::list_transitions))
}
