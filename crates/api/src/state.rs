use std::sync::Arc;

use escutas_core::credentials::TokenManager;
use escutas_db::models::user::User;
use escutas_db::PgCredentialStore;
use escutas_spotify::{SpotifyAccounts, SpotifyApi, SpotifyError};

use crate::config::ServerConfig;
use crate::error::AppResult;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: escutas_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Spotify Web API client.
    pub spotify: SpotifyApi,
    /// Spotify Accounts client (login flow and token refresh).
    pub accounts: Arc<SpotifyAccounts>,
    /// Hands out valid Spotify access tokens per user.
    pub tokens: Arc<TokenManager>,
}

impl AppState {
    /// Wire the Spotify clients and token manager around `pool`.
    pub fn new(pool: escutas_db::DbPool, config: ServerConfig) -> Result<Self, SpotifyError> {
        let http = escutas_spotify::build_http_client()?;
        let spotify = SpotifyApi::new(http.clone(), config.spotify.api_url.clone());
        let accounts = Arc::new(SpotifyAccounts::new(http, config.spotify.accounts())?);
        let tokens = Arc::new(TokenManager::new(
            Arc::new(PgCredentialStore::new(pool.clone())),
            accounts.clone(),
        ));

        Ok(Self {
            pool,
            config: Arc::new(config),
            spotify,
            accounts,
            tokens,
        })
    }

    /// A Spotify access token for `user` that is valid for at least another
    /// minute, refreshing it first if needed.
    pub async fn spotify_token(&self, user: &User) -> AppResult<String> {
        Ok(self
            .tokens
            .get_valid_credential(user.id, &user.credentials())
            .await?)
    }
}
