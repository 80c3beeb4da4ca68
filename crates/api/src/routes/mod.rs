pub mod appraisals;
pub mod health;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /appraisals                                  list, create
/// /appraisals/{id}                             get, update, delete
/// /appraisals/{id}/status                      explicit status change (PUT)
/// /appraisals/{id}/self-review                 submit self-review (POST)
/// /appraisals/{id}/manager-review              submit manager review (POST)
/// /appraisals/{id}/finalize                    finalize (POST)
/// /appraisals/{id}/review                      the employee's review (GET)
/// /appraisals/{id}/transitions                 permitted target statuses (GET)
///
/// /reviews                                     list reviews (GET)
/// /reviews/{id}                                get review
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/appraisals", appraisals::router())
        .nest("/reviews", reviews::router())
}
