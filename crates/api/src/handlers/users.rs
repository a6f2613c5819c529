//! Handlers for the `/users` resource: search and public profiles.

use axum::extract::{Path, Query, State};
use axum::Json;
use escutas_core::error::CoreError;
use escutas_core::types::DbId;
use escutas_db::models::user::UserPublic;
use escutas_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::SearchParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Shortest accepted search term, in characters.
const MIN_SEARCH_LENGTH: usize = 2;

/// GET /api/users/search?q=
///
/// Matches display names partially (case-insensitive) or a Spotify id
/// exactly. Returns at most 20 public profiles.
pub async fn search_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ApiResponse<Vec<UserPublic>>>> {
    let term = params
        .term()
        .filter(|t| t.chars().count() >= MIN_SEARCH_LENGTH)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Search term must be at least {MIN_SEARCH_LENGTH} characters"
            ))
        })?;

    let users = UserRepo::search(&state.pool, term).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<UserPublic>>> {
    let user = UserRepo::find_public(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(ApiResponse::ok(user)))
}
