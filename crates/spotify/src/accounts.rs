//! Spotify Accounts service: authorization code flow and token refresh.

use async_trait::async_trait;
use escutas_core::credentials::{CredentialError, TokenGrant, TokenRefresher};
use reqwest::Url;

use crate::api::SpotifyApi;
use crate::error::SpotifyError;
use crate::models::TokenResponse;

/// Client registration and endpoints for the Accounts service.
#[derive(Debug, Clone)]
pub struct AccountsConfig {
    /// Base URL, e.g. `https://accounts.spotify.com`.
    pub accounts_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Used when a caller does not pass its own.
    pub redirect_uri: String,
    /// Space separated scope list.
    pub scope: String,
}

#[derive(Debug, Clone)]
pub struct SpotifyAccounts {
    client: reqwest::Client,
    authorize_url: Url,
    token_url: Url,
    config: AccountsConfig,
}

impl SpotifyAccounts {
    pub fn new(client: reqwest::Client, config: AccountsConfig) -> Result<Self, SpotifyError> {
        let base = config.accounts_url.trim_end_matches('/');
        let parse = |path: &str| {
            Url::parse(&format!("{base}{path}"))
                .map_err(|e| SpotifyError::Config(format!("{base}{path}: {e}")))
        };
        Ok(Self {
            authorize_url: parse("/authorize")?,
            token_url: parse("/api/token")?,
            client,
            config,
        })
    }

    /// URL the user is sent to in order to grant access.
    pub fn authorize_url(&self, redirect_uri: Option<&str>) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", self.redirect_uri(redirect_uri))
            .append_pair("scope", &self.config.scope);
        url.into()
    }

    /// Trade an authorization code for an access/refresh token pair.
    ///
    /// `redirect_uri` must match the one used to build the authorize URL.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<TokenResponse, SpotifyError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri(redirect_uri)),
        ])
        .await
    }

    /// Obtain a new access token from a refresh token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    fn redirect_uri<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|uri| !uri.trim().is_empty())
            .unwrap_or(&self.config.redirect_uri)
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, SpotifyError> {
        let response = self
            .client
            .post(self.token_url.clone())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await?;

        SpotifyApi::parse_response(response).await
    }
}

#[async_trait]
impl TokenRefresher for SpotifyAccounts {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, CredentialError> {
        let token = self.refresh_token(refresh_token).await.map_err(|e| {
            tracing::error!(error = %e, "Spotify token refresh request failed");
            CredentialError::RefreshFailed(e.to_string())
        })?;
        Ok(TokenGrant {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        })
    }
}
