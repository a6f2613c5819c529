#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use escutas_api::app::build_app;
use escutas_api::auth::jwt::{generate_access_token, JwtConfig};
use escutas_api::config::{ServerConfig, SpotifyConfig, DEFAULT_SPOTIFY_SCOPE};
use escutas_api::state::AppState;
use escutas_db::models::user::{UpsertUser, User};
use escutas_db::repositories::UserRepo;

/// Nothing listens here; catalog calls made by tests that do not start a
/// fake server fail fast.
pub const UNREACHABLE_SPOTIFY: &str = "http://127.0.0.1:9";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 1440,
    }
}

/// Build a test `ServerConfig` whose Spotify endpoints point at `spotify_base`.
///
/// The Web API is expected under `{spotify_base}/v1` and the Accounts
/// service at `{spotify_base}` itself.
pub fn test_config(spotify_base: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: jwt_config(),
        spotify: SpotifyConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost:5173/callback".to_string(),
            scope: DEFAULT_SPOTIFY_SCOPE.to_string(),
            api_url: format!("{spotify_base}/v1"),
            accounts_url: spotify_base.to_string(),
        },
    }
}

/// Build the full application with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_spotify(pool, UNREACHABLE_SPOTIFY)
}

pub fn build_test_app_with_spotify(pool: PgPool, spotify_base: &str) -> Router {
    let state = AppState::new(pool, test_config(spotify_base)).expect("valid test config");
    build_app(state)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user as if they had logged in, with Spotify tokens expiring at
/// `expires_at`.
pub async fn create_user_expiring(
    pool: &PgPool,
    spotify_id: &str,
    name: &str,
    expires_at: DateTime<Utc>,
) -> User {
    UserRepo::upsert_by_spotify_id(
        pool,
        &UpsertUser {
            spotify_id: spotify_id.to_string(),
            display_name: Some(name.to_string()),
            email: Some(format!("{spotify_id}@example.com")),
            access_token: format!("access-{spotify_id}"),
            refresh_token: Some(format!("refresh-{spotify_id}")),
            token_expires_at: expires_at,
        },
    )
    .await
    .expect("user upsert should succeed")
}

pub async fn create_user(pool: &PgPool, spotify_id: &str, name: &str) -> User {
    create_user_expiring(pool, spotify_id, name, Utc::now() + Duration::hours(1)).await
}

/// A bearer token for `user`, signed with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &jwt_config()).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}
