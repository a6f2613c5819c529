//! Route definitions for the `/blog` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::blog;
use crate::state::AppState;

/// Routes mounted at `/blog`.
///
/// Reads address posts by slug and updates by id; both share one path
/// segment.
///
/// ```text
/// GET  /         -> list_posts
/// POST /         -> create_post (requires auth)
/// GET  /{slug}   -> get_post
/// PUT  /{id}     -> update_post (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::list_posts).post(blog::create_post))
        .route("/{key}", get(blog::get_post).put(blog::update_post))
}
