//! Spotify payloads and the trimmed views the backend returns.
//!
//! Wire types only declare the fields this backend reads; unknown fields are
//! ignored by serde.

use escutas_core::blog::TrackMetadata;
use escutas_core::types::Timestamp;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimplifiedArtist {
    pub id: Option<String>,
    pub name: String,
}

/// Album as embedded in tracks and search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SimplifiedAlbum {
    /// Absent for local files.
    pub id: Option<String>,
    pub name: String,
    pub album_type: Option<String>,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
    pub total_tracks: Option<u32>,
}

impl SimplifiedAlbum {
    pub fn is_compilation(&self) -> bool {
        self.album_type.as_deref() == Some("compilation")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimplifiedTrack {
    pub id: Option<String>,
    pub name: String,
    pub track_number: u32,
    #[serde(default)]
    pub duration_ms: u64,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub total: Option<u32>,
}

/// `GET /albums/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumDetail {
    pub id: String,
    pub name: String,
    pub album_type: Option<String>,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
    pub total_tracks: u32,
    pub label: Option<String>,
    pub tracks: Paging<SimplifiedTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FullTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub album: SimplifiedAlbum,
    pub track_number: u32,
    #[serde(default)]
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub is_local: bool,
}

impl FullTrack {
    /// Snapshot stored on blog posts that mention this track.
    pub fn metadata(&self) -> TrackMetadata {
        TrackMetadata {
            name: self.name.clone(),
            artist: join_artists(&self.artists),
            album: self.album.name.clone(),
            cover_url: first_image(&self.album.images),
            preview_url: self.preview_url.clone(),
        }
    }
}

/// `GET /me/player/currently-playing`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentlyPlaying {
    pub is_playing: bool,
    /// `None` between tracks or while an episode plays.
    pub item: Option<FullTrack>,
    pub currently_playing_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayContext {
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
}

/// One entry of `GET /me/player/recently-played`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayHistoryItem {
    pub track: Option<FullTrack>,
    pub played_at: Timestamp,
    pub context: Option<PlayContext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentlyPlayed {
    pub items: Vec<PlayHistoryItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumSearch {
    pub albums: Paging<SimplifiedAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeveralTracks {
    pub tracks: Vec<Option<FullTrack>>,
}

/// `GET /me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// Accounts service token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Only sent when the refresh token is issued or rotated.
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

// ---------------------------------------------------------------------------
// Response views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
    /// Artist names joined with `", "`.
    pub artist: String,
    pub cover_url: Option<String>,
    pub release_date: Option<String>,
}

impl AlbumSummary {
    /// `None` for albums without a catalog id (local files).
    pub fn from_album(album: &SimplifiedAlbum) -> Option<Self> {
        Some(Self {
            id: album.id.clone()?,
            name: album.name.clone(),
            artist: join_artists(&album.artists),
            cover_url: first_image(&album.images),
            release_date: album.release_date.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSummary {
    pub id: Option<String>,
    pub name: String,
    pub track_number: u32,
    pub duration_ms: u64,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumFull {
    #[serde(flatten)]
    pub summary: AlbumSummary,
    pub total_tracks: u32,
    pub label: Option<String>,
    pub tracks: Vec<TrackSummary>,
}

impl From<AlbumDetail> for AlbumFull {
    fn from(album: AlbumDetail) -> Self {
        Self {
            summary: AlbumSummary {
                artist: join_artists(&album.artists),
                cover_url: first_image(&album.images),
                id: album.id,
                name: album.name,
                release_date: album.release_date,
            },
            total_tracks: album.total_tracks,
            label: album.label,
            tracks: album
                .tracks
                .items
                .into_iter()
                .map(|t| TrackSummary {
                    id: t.id,
                    name: t.name,
                    track_number: t.track_number,
                    duration_ms: t.duration_ms,
                    preview_url: t.preview_url,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentPlayback {
    pub is_playing: bool,
    pub track_name: Option<String>,
    pub album: Option<AlbumSummary>,
}

impl From<CurrentlyPlaying> for CurrentPlayback {
    fn from(playing: CurrentlyPlaying) -> Self {
        let album = playing
            .item
            .as_ref()
            .and_then(|t| AlbumSummary::from_album(&t.album));
        Self {
            is_playing: playing.is_playing,
            track_name: playing.item.map(|t| t.name),
            album,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(flatten)]
    pub album: AlbumSummary,
    pub play_count: usize,
    pub reason: String,
}

fn join_artists(artists: &[SimplifiedArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_image(images: &[Image]) -> Option<String> {
    images.first().map(|i| i.url.clone())
}
