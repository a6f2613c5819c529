//! Spotify Web API and Accounts clients.
//!
//! [`SpotifyApi`] reads catalog and playback data with a caller-supplied
//! access token; it never refreshes on its own. [`SpotifyAccounts`] runs the
//! authorization code flow and implements
//! [`TokenRefresher`](escutas_core::credentials::TokenRefresher) for the
//! token manager.

use std::time::Duration;

pub mod accounts;
pub mod api;
pub mod error;
pub mod models;
pub mod suggestions;

pub use accounts::{AccountsConfig, SpotifyAccounts};
pub use api::SpotifyApi;
pub use error::SpotifyError;

/// Upper bound on any single outbound call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default Web API base URL.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Default Accounts service base URL.
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Build the shared HTTP client used by both API clients.
pub fn build_http_client() -> Result<reqwest::Client, SpotifyError> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}
