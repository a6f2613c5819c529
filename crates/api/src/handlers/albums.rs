//! Handlers for the `/albums` resource, backed by the Spotify catalog.

use axum::extract::{Path, Query, State};
use axum::Json;
use escutas_spotify::api::DEFAULT_SEARCH_LIMIT;
use escutas_spotify::models::{AlbumFull, AlbumSummary};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::SearchParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/albums/search?q=
pub async fn search_albums(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ApiResponse<Vec<AlbumSummary>>>> {
    let term = params
        .term()
        .ok_or_else(|| AppError::BadRequest("Search term is required".into()))?;

    let token = state.spotify_token(&auth.user).await?;
    let albums = state
        .spotify
        .search_albums(&token, term, DEFAULT_SEARCH_LIMIT)
        .await?;

    Ok(Json(ApiResponse::ok(albums)))
}

/// GET /api/albums/{spotify_id}
pub async fn get_album(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(spotify_id): Path<String>,
) -> AppResult<Json<ApiResponse<AlbumFull>>> {
    let token = state.spotify_token(&auth.user).await?;
    let album = state
        .spotify
        .album(&token, &spotify_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Album {spotify_id} not found")))?;

    Ok(Json(ApiResponse::ok(album)))
}
