//! Route definitions for the `/auth` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// GET /spotify-url  -> spotify_url
/// GET /callback     -> callback
/// GET /me           -> me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/spotify-url", get(auth::spotify_url))
        .route("/callback", get(auth::callback))
        .route("/me", get(auth::me))
}
