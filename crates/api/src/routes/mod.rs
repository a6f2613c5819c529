pub mod albums;
pub mod auth;
pub mod blog;
pub mod health;
pub mod reviews;
pub mod spotify;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/spotify-url                   authorize URL (public)
/// /auth/callback                      code exchange + login (public)
/// /auth/me                            current user (auth)
///
/// /reviews                            create (POST, auth)
/// /reviews/history                    own history, paginated (auth)
/// /reviews/calendar                   own calendar (auth)
/// /reviews/{id}                       review detail (public)
/// /reviews/user/{id}/history          another user's history (auth)
/// /reviews/user/{id}/calendar         another user's calendar (auth)
///
/// /spotify/now-playing                current playback (auth)
/// /spotify/suggestions                album suggestions (auth)
///
/// /albums/search                      catalog album search (auth)
/// /albums/{spotify_id}                catalog album detail (auth)
///
/// /users/search                       user search (auth)
/// /users/{id}                         public profile (auth)
///
/// /blog                               list published (GET), create (POST, auth)
/// /blog/{slug}                        published detail (GET)
/// /blog/{id}                          update (PUT, auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/reviews", reviews::router())
        .nest("/spotify", spotify::router())
        .nest("/albums", albums::router())
        .nest("/users", users::router())
        .nest("/blog", blog::router())
}
