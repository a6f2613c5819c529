//! HTTP-level tests for `/api/reviews`.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use common::{body_json, create_user, get, get_auth, post_json_auth, token_for};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

fn submission(album_id: Option<&str>, scores: &[Value]) -> Value {
    let tracks: Vec<Value> = scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            json!({
                "id": format!("track{i}"),
                "name": format!("Track {}", i + 1),
                "track_number": i + 1,
                "userScore": score,
            })
        })
        .collect();

    json!({
        "album": {
            "id": album_id,
            "name": "Clube da Esquina",
            "artist": "Milton Nascimento, Lô Borges",
            "cover": "https://img/cover.jpg",
        },
        "review_text": "<p>A <b>masterpiece</b></p>",
        "tracks": tracks,
    })
}

async fn review_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM album_reviews")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_review_returns_aggregate_and_tracks(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool);

    let body = submission(Some("album123"), &[json!(10), json!("9"), json!(9.5)]);
    let response = post_json_auth(app, "/api/reviews", body, &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    let data = &json["data"];
    assert_eq!(data["album_id"], "album123");
    assert_eq!(data["score"], 9.5);
    assert_eq!(data["tier"], "S");
    assert_eq!(data["review_text"], "A masterpiece");
    assert_eq!(data["tracks"].as_array().unwrap().len(), 3);
    assert_eq!(data["tracks"][1]["score"], 9.0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_without_album_id_gets_custom_ref(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/reviews",
        submission(None, &[json!(4)]),
        &token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["data"]["album_id"]
        .as_str()
        .unwrap()
        .starts_with("custom:"));
    assert_eq!(json["data"]["tier"], "D");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_out_of_range_score_persists_nothing(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool.clone());

    let body = submission(Some("album123"), &[json!(8), json!(11)]);
    let response = post_json_auth(app, "/api/reviews", body, &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().contains("Track 2"));
    assert_eq!(review_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_track_without_score_gets_error_envelope(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool.clone());

    let body = json!({
        "album": {"id": "album123", "name": "Clube da Esquina", "artist": "Milton Nascimento"},
        "tracks": [{"name": "Tudo Que Você Podia Ser", "track_number": 1}]
    });
    let response = post_json_auth(app, "/api/reviews", body, &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Tudo Que Você Podia Ser"));
    assert_eq!(review_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_mistyped_body_gets_error_envelope(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool);

    let body = json!({
        "album": {"name": "Clube da Esquina", "artist": "Milton Nascimento"},
        "tracks": [{"name": "Cais", "track_number": "three", "userScore": 9}]
    });
    let response = post_json_auth(app.clone(), "/api/reviews", body, &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "BAD_REQUEST");

    let response = post_json_auth(
        app,
        "/api/reviews",
        json!({"tracks": []}),
        &token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], "error");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_repeated_track_is_rejected_before_persisting(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool.clone());

    let body = json!({
        "album": {"id": "album123", "name": "Clube da Esquina", "artist": "Milton Nascimento"},
        "tracks": [
            {"id": "t1", "name": "Cais", "track_number": 1, "userScore": 9},
            {"id": "t1", "name": "Cais (again)", "track_number": 2, "userScore": 8}
        ]
    });
    let response = post_json_auth(app, "/api/reviews", body, &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().contains("Cais (again)"));
    assert_eq!(review_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_numeric_score_is_rejected(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool);

    let body = submission(Some("album123"), &[json!("great")]);
    let response = post_json_auth(app, "/api/reviews", body, &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/reviews/history").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_history_is_paginated_and_filterable(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    for album in ["a1", "a2", "a1"] {
        let response = post_json_auth(
            app.clone(),
            "/api/reviews",
            submission(Some(album), &[json!(7)]),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(app.clone(), "/api/reviews/history?per_page=2", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["meta"]["total_items"], 3);
    assert_eq!(json["meta"]["total_pages"], 2);
    assert_eq!(json["meta"]["has_next"], true);
    assert_eq!(json["meta"]["has_prev"], false);

    let response = get_auth(app, "/api/reviews/history?album_id=a1", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["meta"]["total_items"], 2);
    for review in json["data"].as_array().unwrap() {
        assert_eq!(review["album_id"], "a1");
        assert_eq!(review["tracks"].as_array().unwrap().len(), 1);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_calendar_groups_current_month_by_day(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    post_json_auth(
        app.clone(),
        "/api/reviews",
        submission(Some("a1"), &[json!(6)]),
        &token,
    )
    .await;

    let response = get_auth(app, "/api/reviews/calendar", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let today = Utc::now();
    assert_eq!(json["data"]["month"], today.month());
    assert_eq!(json["data"]["year"], today.year());
    let day = &json["data"]["days"][today.day().to_string()];
    assert_eq!(day.as_array().unwrap().len(), 1);
    assert_eq!(day[0]["album_id"], "a1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_calendar_rejects_invalid_month(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool);

    let response = get_auth(
        app,
        "/api/reviews/calendar?month=13&year=2024",
        &token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_detail_is_public(pool: PgPool) {
    let user = create_user(&pool, "sp-ana", "Ana").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/reviews",
        submission(Some("a1"), &[json!(8)]),
        &token_for(&user),
    )
    .await;
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = get(app.clone(), &format!("/api/reviews/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["tier"], "B");

    let response = get(app, &format!("/api/reviews/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_other_users_history_and_calendar(pool: PgPool) {
    let author = create_user(&pool, "sp-ana", "Ana").await;
    let reader = create_user(&pool, "sp-bia", "Bia").await;
    let app = common::build_test_app(pool);

    post_json_auth(
        app.clone(),
        "/api/reviews",
        submission(Some("a1"), &[json!(9)]),
        &token_for(&author),
    )
    .await;

    let reader_token = token_for(&reader);
    let response = get_auth(
        app.clone(),
        &format!("/api/reviews/user/{}/history", author.id),
        &reader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["meta"]["total_items"], 1);

    let response = get_auth(
        app.clone(),
        &format!("/api/reviews/user/{}/calendar", author.id),
        &reader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        app,
        &format!("/api/reviews/user/{}/history", Uuid::new_v4()),
        &reader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
