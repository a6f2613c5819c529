//! Route definitions for the `/spotify` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::spotify;
use crate::state::AppState;

/// Routes mounted at `/spotify`.
///
/// ```text
/// GET /now-playing  -> now_playing
/// GET /suggestions  -> suggestions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/now-playing", get(spotify::now_playing))
        .route("/suggestions", get(spotify::suggestions))
}
