//! Route definitions for the `/albums` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::albums;
use crate::state::AppState;

/// Routes mounted at `/albums`.
///
/// ```text
/// GET /search         -> search_albums
/// GET /{spotify_id}   -> get_album
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(albums::search_albums))
        .route("/{spotify_id}", get(albums::get_album))
}
