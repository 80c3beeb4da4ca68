use axum::routing::get;
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Review routes, nested under `/reviews`.
///
/// ```text
/// GET    /                          list_reviews
/// GET    /{id}                      get_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list_reviews))
        .route("/{id}", get(reviews::get_review))
}
