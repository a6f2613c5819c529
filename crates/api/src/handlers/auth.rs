//! Handlers for the `/auth` resource (Spotify login and the current user).

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use escutas_core::error::CoreError;
use escutas_db::models::user::{UpsertUser, UserResponse};
use escutas_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query for `GET /auth/spotify-url`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeParams {
    pub redirect_uri: Option<String>,
}

/// Query for `GET /auth/callback`.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeUrl {
    pub url: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/auth/spotify-url
pub async fn spotify_url(
    State(state): State<AppState>,
    Query(params): Query<AuthorizeParams>,
) -> Json<ApiResponse<AuthorizeUrl>> {
    let url = state.accounts.authorize_url(params.redirect_uri.as_deref());
    Json(ApiResponse::ok(AuthorizeUrl { url }))
}

/// GET /api/auth/callback
///
/// Exchange the authorization code, upsert the user by Spotify id and issue
/// an access token for this API.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let code = params
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".into()))?;

    let token = state
        .accounts
        .exchange_code(code, params.redirect_uri.as_deref())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Spotify code exchange failed");
            match e.status() {
                Some(400 | 401) => AppError::Core(CoreError::Unauthorized(
                    "Spotify authorization failed".into(),
                )),
                _ => AppError::Spotify(e),
            }
        })?;

    let profile = state.spotify.current_user(&token.access_token).await?;

    let user = UserRepo::upsert_by_spotify_id(
        &state.pool,
        &UpsertUser {
            spotify_id: profile.id,
            display_name: profile.display_name,
            email: profile.email,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_expires_at: Utc::now() + Duration::seconds(token.expires_in),
        },
    )
    .await?;

    let access_token = generate_access_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in with Spotify");

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        AuthResponse {
            access_token,
            token_type: "Bearer",
            expires_in: state.config.jwt.expires_in_secs(),
            user: UserResponse::from(&user),
        },
    )))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(UserResponse::from(&auth.user)))
}
