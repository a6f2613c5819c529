/// Errors from the Spotify API layer.
#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Spotify returned a non-2xx status code.
    #[error("Spotify API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body, for server-side logs only.
        body: String,
    },

    /// A configured base URL could not be parsed.
    #[error("Invalid Spotify URL configuration: {0}")]
    Config(String),
}

impl SpotifyError {
    /// Status code of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Config(_) => None,
        }
    }
}
