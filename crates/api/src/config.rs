use escutas_spotify::{AccountsConfig, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL};

use crate::auth::jwt::JwtConfig;

/// Scopes requested when none are configured.
pub const DEFAULT_SPOTIFY_SCOPE: &str =
    "user-library-read user-read-email user-read-currently-playing user-read-recently-played";

/// Server configuration loaded from environment variables.
///
/// All fields except secrets have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Spotify client registration and endpoints.
    pub spotify: SpotifyConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// # Panics
    ///
    /// Panics on malformed values or missing secrets; misconfiguration
    /// must stop startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            spotify: SpotifyConfig::from_env(),
        }
    }
}

/// Spotify application credentials and endpoints.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub api_url: String,
    pub accounts_url: String,
}

impl SpotifyConfig {
    /// Load Spotify settings from environment variables.
    ///
    /// | Env Var                 | Required | Default                         |
    /// |-------------------------|----------|---------------------------------|
    /// | `SPOTIFY_CLIENT_ID`     | **yes**  | --                              |
    /// | `SPOTIFY_CLIENT_SECRET` | **yes**  | --                              |
    /// | `SPOTIFY_REDIRECT_URI`  | **yes**  | --                              |
    /// | `SPOTIFY_SCOPE`         | no       | [`DEFAULT_SPOTIFY_SCOPE`]       |
    /// | `SPOTIFY_API_URL`       | no       | `https://api.spotify.com/v1`    |
    /// | `SPOTIFY_ACCOUNTS_URL`  | no       | `https://accounts.spotify.com`  |
    pub fn from_env() -> Self {
        let required = |name: &str| {
            let value =
                std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"));
            assert!(!value.trim().is_empty(), "{name} must not be empty");
            value
        };

        Self {
            client_id: required("SPOTIFY_CLIENT_ID"),
            client_secret: required("SPOTIFY_CLIENT_SECRET"),
            redirect_uri: required("SPOTIFY_REDIRECT_URI"),
            scope: std::env::var("SPOTIFY_SCOPE").unwrap_or_else(|_| DEFAULT_SPOTIFY_SCOPE.into()),
            api_url: std::env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            accounts_url: std::env::var("SPOTIFY_ACCOUNTS_URL")
                .unwrap_or_else(|_| DEFAULT_ACCOUNTS_URL.into()),
        }
    }

    pub fn accounts(&self) -> AccountsConfig {
        AccountsConfig {
            accounts_url: self.accounts_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scope: self.scope.clone(),
        }
    }
}
