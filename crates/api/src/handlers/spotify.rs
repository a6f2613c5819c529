//! Handlers for the `/spotify` resource: playback status and suggestions.

use axum::extract::{Query, State};
use axum::Json;
use escutas_spotify::models::{CurrentPlayback, Suggestion};
use escutas_spotify::suggestions::{suggest_albums, DEFAULT_HISTORY_LIMIT, DEFAULT_THRESHOLD};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query for `GET /spotify/suggestions`.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    /// Recent plays to inspect (1-50).
    pub limit: Option<u32>,
    /// Minimum plays per album.
    pub threshold: Option<usize>,
}

/// GET /api/spotify/now-playing
///
/// `data` is `null` when nothing is playing.
pub async fn now_playing(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Option<CurrentPlayback>>>> {
    let token = state.spotify_token(&auth.user).await?;
    let playing = state.spotify.currently_playing(&token).await?;

    Ok(Json(ApiResponse::with_message(
        "Playback status retrieved",
        playing.map(CurrentPlayback::from),
    )))
}

/// GET /api/spotify/suggestions
pub async fn suggestions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SuggestionParams>,
) -> AppResult<Json<ApiResponse<Vec<Suggestion>>>> {
    let token = state.spotify_token(&auth.user).await?;
    let history = state
        .spotify
        .recently_played(&token, params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await?;

    let found = suggest_albums(&history, params.threshold.unwrap_or(DEFAULT_THRESHOLD).max(1));
    tracing::debug!(user_id = %auth.user_id, count = found.len(), "Computed album suggestions");

    Ok(Json(ApiResponse::with_message(
        format!("Found {} album suggestions", found.len()),
        found,
    )))
}
