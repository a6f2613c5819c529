//! REST client for the Spotify Web API.
//!
//! Every call takes the user's access token explicitly; obtaining a valid
//! one is the token manager's job.

use reqwest::StatusCode;

use crate::error::SpotifyError;
use crate::models::{
    AlbumDetail, AlbumFull, AlbumSearch, AlbumSummary, CurrentlyPlaying, FullTrack,
    PlayHistoryItem, RecentlyPlayed, SeveralTracks, UserProfile,
};

/// Page size for album search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
/// Largest page the recently-played endpoint serves.
pub const MAX_RECENTLY_PLAYED: u32 = 50;
/// Largest id batch accepted by `GET /tracks`.
pub const TRACKS_BATCH_SIZE: usize = 50;

/// HTTP client for the Spotify Web API.
#[derive(Clone)]
pub struct SpotifyApi {
    client: reqwest::Client,
    api_url: String,
}

impl SpotifyApi {
    /// * `api_url` - Base URL, e.g. `https://api.spotify.com/v1`.
    pub fn new(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Profile of the user owning `token`.
    pub async fn current_user(&self, token: &str) -> Result<UserProfile, SpotifyError> {
        let response = self
            .client
            .get(format!("{}/me", self.api_url))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Search albums by free text. Compilations are left out.
    pub async fn search_albums(
        &self,
        token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<AlbumSummary>, SpotifyError> {
        let limit = limit.clamp(1, 50).to_string();
        let response = self
            .client
            .get(format!("{}/search", self.api_url))
            .bearer_auth(token)
            .query(&[("q", query), ("type", "album"), ("limit", limit.as_str())])
            .send()
            .await?;

        let search: AlbumSearch = Self::parse_response(response).await?;
        Ok(search
            .albums
            .items
            .iter()
            .filter(|album| !album.is_compilation())
            .filter_map(AlbumSummary::from_album)
            .collect())
    }

    /// Album with its track listing.
    ///
    /// Returns `None` when Spotify reports the id as unknown or malformed.
    pub async fn album(&self, token: &str, id: &str) -> Result<Option<AlbumFull>, SpotifyError> {
        let response = self
            .client
            .get(format!("{}/albums/{}", self.api_url, id))
            .bearer_auth(token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST
        ) {
            return Ok(None);
        }
        let detail: AlbumDetail = Self::parse_response(response).await?;
        Ok(Some(detail.into()))
    }

    /// The user's current playback. `None` when nothing is playing.
    pub async fn currently_playing(
        &self,
        token: &str,
    ) -> Result<Option<CurrentlyPlaying>, SpotifyError> {
        let response = self
            .client
            .get(format!("{}/me/player/currently-playing", self.api_url))
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    /// Most recent play events, newest first. `limit` is clamped to 1-50.
    pub async fn recently_played(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<PlayHistoryItem>, SpotifyError> {
        let limit = limit.clamp(1, MAX_RECENTLY_PLAYED).to_string();
        let response = self
            .client
            .get(format!("{}/me/player/recently-played", self.api_url))
            .bearer_auth(token)
            .query(&[("limit", limit.as_str())])
            .send()
            .await?;

        let page: RecentlyPlayed = Self::parse_response(response).await?;
        Ok(page.items)
    }

    /// Full track objects for `ids`, fetched in batches. Unknown ids are
    /// skipped.
    pub async fn tracks(&self, token: &str, ids: &[String]) -> Result<Vec<FullTrack>, SpotifyError> {
        let mut tracks = Vec::with_capacity(ids.len());
        for batch in ids.chunks(TRACKS_BATCH_SIZE) {
            let response = self
                .client
                .get(format!("{}/tracks", self.api_url))
                .bearer_auth(token)
                .query(&[("ids", batch.join(","))])
                .send()
                .await?;

            let page: SeveralTracks = Self::parse_response(response).await?;
            tracks.extend(page.tracks.into_iter().flatten());
        }
        Ok(tracks)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an
    /// [`SpotifyError::ApiError`] with the status and body text.
    pub(crate) async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SpotifyError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SpotifyError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SpotifyError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
