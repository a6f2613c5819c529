//! End-to-end tests for catalog-backed endpoints against a local fake of
//! the Spotify Web API and Accounts service.

mod common;

use std::collections::HashMap;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::{Duration, Utc};
use common::{body_json, create_user, create_user_expiring, get_auth, post_json_auth, token_for};
use escutas_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

const TRACK_ID: &str = "4uLU6hMCjMI75M1A2tKUQC";

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

fn simplified_album(id: &str, album_type: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Album {id}"),
        "album_type": album_type,
        "artists": [{"id": "art", "name": "Milton Nascimento"}],
        "images": [{"url": format!("https://img/{id}"), "height": 640, "width": 640}],
        "release_date": "1972"
    })
}

fn full_track(album_id: &str) -> serde_json::Value {
    json!({
        "id": TRACK_ID,
        "name": "Cais",
        "artists": [{"id": "art", "name": "Milton Nascimento"}],
        "album": simplified_album(album_id, "album"),
        "track_number": 3,
        "duration_ms": 200000,
        "preview_url": "https://preview/cais",
        "is_local": false
    })
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") if form.get("code").map(String::as_str) == Some("good-code") => {
            Json(json!({
                "access_token": "code-access",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "code-refresh"
            }))
            .into_response()
        }
        Some("refresh_token") => Json(json!({
            "access_token": "fresh-access",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "rotated-refresh"
        }))
        .into_response(),
        _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response(),
    }
}

async fn me(headers: HeaderMap) -> Response {
    if bearer(&headers) != "code-access" {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"id": "sp-new", "display_name": "New Listener", "email": "new@example.com"}))
        .into_response()
}

/// Playing only for the refreshed token, so tests can tell which token was used.
async fn currently_playing(headers: HeaderMap) -> Response {
    if bearer(&headers) == "fresh-access" {
        Json(json!({
            "is_playing": true,
            "item": full_track("clube"),
            "currently_playing_type": "track"
        }))
        .into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn recently_played() -> Json<serde_json::Value> {
    let play = |album: &str| {
        json!({
            "track": full_track(album),
            "played_at": "2024-05-07T10:00:00Z",
            "context": {"type": "album", "uri": format!("spotify:album:{album}")}
        })
    };
    Json(json!({
        "items": [play("clube"), play("minas"), play("clube"), play("clube")]
    }))
}

async fn album(Path(id): Path<String>) -> Response {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": {"status": 404}}))).into_response();
    }
    let mut detail = simplified_album(&id, "album");
    detail["total_tracks"] = json!(1);
    detail["label"] = json!("EMI");
    detail["tracks"] = json!({
        "items": [{"id": TRACK_ID, "name": "Cais", "track_number": 1, "duration_ms": 200000, "preview_url": null}],
        "next": null,
        "total": 1
    });
    Json(detail).into_response()
}

async fn search() -> Json<serde_json::Value> {
    Json(json!({
        "albums": {
            "items": [simplified_album("clube", "album"), simplified_album("hits", "compilation")],
            "next": null,
            "total": 2
        }
    }))
}

async fn tracks() -> Json<serde_json::Value> {
    Json(json!({"tracks": [full_track("clube"), null]}))
}

/// Start the fake on an ephemeral port and return its base URL.
async fn start_fake_spotify() -> String {
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/me", get(me))
        .route("/v1/me/player/currently-playing", get(currently_playing))
        .route("/v1/me/player/recently-played", get(recently_played))
        .route("/v1/albums/{id}", get(album))
        .route("/v1/search", get(search))
        .route("/v1/tracks", get(tracks));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_callback_creates_user_and_issues_token(pool: PgPool) {
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool.clone(), &base);

    let response = common::get(app.clone(), "/api/auth/callback?code=good-code").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert_eq!(json["data"]["user"]["spotify_id"], "sp-new");
    let access_token = json["data"]["access_token"].as_str().unwrap().to_string();

    let response = get_auth(app, "/api/auth/me", &access_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["display_name"], "New Listener");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE spotify_id = 'sp-new'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_callback_with_rejected_code_is_unauthorized(pool: PgPool) {
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool, &base);

    let response = common::get(app, "/api/auth/callback?code=bad-code").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Playback and token refresh
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_nothing_playing_returns_null_data(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool, &base);

    let response = get_auth(app, "/api/spotify/now-playing", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert!(json["data"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_expiring_token_is_refreshed_and_persisted(pool: PgPool) {
    let user =
        create_user_expiring(&pool, "sp-ana", "Ana", Utc::now() + Duration::seconds(30)).await;
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool.clone(), &base);

    let response = get_auth(app, "/api/spotify/now-playing", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["is_playing"], true);
    assert_eq!(json["data"]["track_name"], "Cais");
    assert_eq!(json["data"]["album"]["id"], "clube");

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("fresh-access"));
    assert_eq!(stored.refresh_token.as_deref(), Some("rotated-refresh"));
    assert!(stored.token_expires_at.unwrap() > Utc::now() + Duration::minutes(30));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_without_refresh_token_must_log_in_again(pool: PgPool) {
    let user =
        create_user_expiring(&pool, "sp-ana", "Ana", Utc::now() - Duration::minutes(5)).await;
    sqlx::query("UPDATE users SET refresh_token = NULL WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool, &base);

    let response = get_auth(app, "/api/spotify/now-playing", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Suggestions and catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_suggestions_count_album_plays(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool, &base);

    let response = get_auth(app, "/api/spotify/suggestions", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let suggestions = json["data"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["id"], "clube");
    assert_eq!(suggestions[0]["play_count"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_album_search_skips_compilations(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool, &base);
    let token = token_for(&user);

    let response = get_auth(app.clone(), "/api/albums/search?q=milton", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let albums = json["data"].as_array().unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0]["id"], "clube");
    assert_eq!(albums[0]["artist"], "Milton Nascimento");

    let response = get_auth(app, "/api/albums/search?q=%20", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_album_detail_and_unknown_album(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool, &base);
    let token = token_for(&user);

    let response = get_auth(app.clone(), "/api/albums/clube", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "clube");
    assert_eq!(json["data"]["label"], "EMI");
    assert_eq!(json["data"]["tracks"][0]["name"], "Cais");

    let response = get_auth(app, "/api/albums/missing", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_post_captures_mentioned_track_metadata(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let base = start_fake_spotify().await;
    let app = common::build_test_app_with_spotify(pool, &base);

    let body = json!({
        "title": "Listening notes",
        "slug": "listening-notes",
        "content": format!("Start with spotify:track:{TRACK_ID} and then spotify:track:{TRACK_ID}."),
    });
    let response = post_json_auth(app, "/api/blog", body, &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let snapshot = &json["data"]["track_metadata"][TRACK_ID];
    assert_eq!(snapshot["name"], "Cais");
    assert_eq!(snapshot["artist"], "Milton Nascimento");
    assert_eq!(snapshot["album"], "Album clube");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_catalog_outage_is_upstream_error(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/spotify/now-playing", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");
}
