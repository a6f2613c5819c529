//! Album and track review models.
//!
//! Serialized field names follow the public JSON shape (`artist`, `cover`,
//! `score`), not the column names.

use escutas_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `album_reviews`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AlbumReview {
    pub id: DbId,
    pub user_id: DbId,
    pub album_id: String,
    pub album_name: String,
    #[serde(rename = "artist")]
    pub artist_name: String,
    #[serde(rename = "cover")]
    pub cover_url: Option<String>,
    pub review_text: Option<String>,
    #[serde(rename = "score")]
    pub average_score: f64,
    pub tier: String,
    pub created_at: Timestamp,
}

/// A row from `track_reviews`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TrackReview {
    pub id: DbId,
    #[serde(skip)]
    pub album_review_id: DbId,
    #[serde(rename = "track_id")]
    pub spotify_track_id: Option<String>,
    #[serde(rename = "name")]
    pub track_name: String,
    #[serde(rename = "number")]
    pub track_number: i32,
    pub score: f64,
}

/// A review together with its tracks, ordered by track number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumReviewWithTracks {
    #[serde(flatten)]
    pub review: AlbumReview,
    pub tracks: Vec<TrackReview>,
}

/// Lightweight review entry used by the calendar view.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ReviewSummary {
    pub id: DbId,
    pub album_id: String,
    pub album_name: String,
    #[serde(rename = "artist")]
    pub artist_name: String,
    #[serde(rename = "cover")]
    pub cover_url: Option<String>,
    #[serde(rename = "score")]
    pub average_score: f64,
    pub tier: String,
    pub created_at: Timestamp,
}
