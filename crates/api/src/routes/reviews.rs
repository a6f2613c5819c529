//! Route definitions for the `/reviews` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// POST /                      -> create_review
/// GET  /history               -> history
/// GET  /calendar              -> calendar
/// GET  /{id}                  -> get_review (public)
/// GET  /user/{id}/history     -> user_history
/// GET  /user/{id}/calendar    -> user_calendar
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create_review))
        .route("/history", get(reviews::history))
        .route("/calendar", get(reviews::calendar))
        .route("/{id}", get(reviews::get_review))
        .route("/user/{id}/history", get(reviews::user_history))
        .route("/user/{id}/calendar", get(reviews::user_calendar))
}
