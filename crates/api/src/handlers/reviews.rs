//! Handlers for the `/reviews` resource: creation, history, calendar and
//! read access to other users' reviews.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use escutas_core::error::CoreError;
use escutas_core::history::{group_by_day, CalendarMonth, PageMeta};
use escutas_core::review::{prepare_review, ReviewSubmission};
use escutas_core::types::DbId;
use escutas_db::models::review::{AlbumReviewWithTracks, ReviewSummary};
use escutas_db::repositories::{ReviewRepo, UserRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::{CalendarParams, HistoryParams};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::state::AppState;

/// Calendar payload: reviews of one month bucketed by day.
#[derive(Debug, Serialize)]
pub struct CalendarData {
    pub month: u32,
    pub year: i32,
    /// Day-of-month (unpadded) to that day's reviews, newest first.
    pub days: BTreeMap<String, Vec<ReviewSummary>>,
}

// ---------------------------------------------------------------------------
// Own reviews
// ---------------------------------------------------------------------------

/// POST /api/reviews
///
/// Validates the whole submission, computes the aggregate, then writes the
/// review and its tracks in one transaction.
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<ReviewSubmission>,
) -> AppResult<(StatusCode, Json<ApiResponse<AlbumReviewWithTracks>>)> {
    let validated = prepare_review(&input)?;
    let review = ReviewRepo::create(&state.pool, auth.user_id, &validated).await?;

    tracing::info!(
        user_id = %auth.user_id,
        review_id = %review.review.id,
        album_id = %review.review.album_id,
        tier = %review.review.tier,
        "Review created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Review saved", review)),
    ))
}

/// GET /api/reviews/history
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<PaginatedResponse<AlbumReviewWithTracks>>> {
    load_history(&state, auth.user_id, &params).await.map(Json)
}

/// GET /api/reviews/calendar
pub async fn calendar(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<CalendarParams>,
) -> AppResult<Json<ApiResponse<CalendarData>>> {
    load_calendar(&state, auth.user_id, &params).await.map(Json)
}

/// GET /api/reviews/{id}
///
/// Public, so review links can be shared.
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<AlbumReviewWithTracks>>> {
    let review = ReviewRepo::find_with_tracks(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Review",
            id,
        })?;
    Ok(Json(ApiResponse::ok(review)))
}

// ---------------------------------------------------------------------------
// Other users
// ---------------------------------------------------------------------------

/// GET /api/reviews/user/{id}/history
pub async fn user_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<DbId>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<PaginatedResponse<AlbumReviewWithTracks>>> {
    ensure_user_exists(&state, user_id).await?;
    load_history(&state, user_id, &params).await.map(Json)
}

/// GET /api/reviews/user/{id}/calendar
pub async fn user_calendar(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<DbId>,
    Query(params): Query<CalendarParams>,
) -> AppResult<Json<ApiResponse<CalendarData>>> {
    ensure_user_exists(&state, user_id).await?;
    load_calendar(&state, user_id, &params).await.map(Json)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_user_exists(state: &AppState, user_id: DbId) -> AppResult<()> {
    if !UserRepo::exists(&state.pool, user_id).await? {
        return Err(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }
        .into());
    }
    Ok(())
}

async fn load_history(
    state: &AppState,
    user_id: DbId,
    params: &HistoryParams,
) -> AppResult<PaginatedResponse<AlbumReviewWithTracks>> {
    let page = params.page_request();
    let filters = params.filters();

    let total = ReviewRepo::count_for_user(&state.pool, user_id, &filters).await?;
    let reviews = ReviewRepo::list_for_user(&state.pool, user_id, &filters, page).await?;

    Ok(PaginatedResponse::new(reviews, PageMeta::new(page, total)))
}

async fn load_calendar(
    state: &AppState,
    user_id: DbId,
    params: &CalendarParams,
) -> AppResult<ApiResponse<CalendarData>> {
    let current = CalendarMonth::current(Utc::now());
    let month = CalendarMonth::new(
        params.month.unwrap_or(i64::from(current.month())),
        params.year.unwrap_or(i64::from(current.year())),
    )?;

    let (start, end) = month.bounds();
    let summaries = ReviewRepo::list_between(&state.pool, user_id, start, end).await?;

    Ok(ApiResponse::ok(CalendarData {
        month: month.month(),
        year: month.year(),
        days: group_by_day(summaries, |s| s.created_at),
    }))
}
