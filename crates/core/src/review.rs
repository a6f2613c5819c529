//! Review aggregation: score validation, album identity and tiers.
//!
//! A review submission is validated and fully materialized here before the
//! DB layer sees it. The average and tier are computed once, by
//! [`aggregate`], from the complete list of track scores, so a persisted
//! review never carries an aggregate that disagrees with its tracks.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length of the sanitized review body, in characters.
pub const MAX_REVIEW_TEXT_LENGTH: usize = 5_000;

/// Lowest accepted track score.
pub const MIN_SCORE: f64 = 0.0;

/// Highest accepted track score.
pub const MAX_SCORE: f64 = 10.0;

/// Prefix marking an album reference generated for a user-authored album.
pub const CUSTOM_ALBUM_PREFIX: &str = "custom:";

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("valid markup regex"));

/* --------------------------------------------------------------------------
Errors
-------------------------------------------------------------------------- */

/// Reasons a review submission is rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReviewError {
    #[error("Review text is too long ({length} characters). Maximum is {max}", max = MAX_REVIEW_TEXT_LENGTH)]
    TextTooLong { length: usize },

    #[error("Invalid score for track '{track}': {reason}")]
    InvalidScore { track: String, reason: String },

    #[error("Invalid track number {number} for track '{track}'. Track numbers start at 1")]
    InvalidTrackNumber { track: String, number: i32 },

    #[error("Album name and artist are required")]
    MissingAlbum,

    #[error("At least one track is required")]
    MissingTracks,

    #[error("Track '{track}' appears more than once in this review")]
    DuplicateTrack { track: String },
}

impl From<ReviewError> for CoreError {
    fn from(err: ReviewError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/* --------------------------------------------------------------------------
Tier
-------------------------------------------------------------------------- */

/// Letter grade derived from a review's average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
    E,
}

impl Tier {
    /// Map an average score onto a tier. Bounds are inclusive lower bounds
    /// evaluated from the top.
    pub fn from_average(average: f64) -> Self {
        if average >= 9.5 {
            Tier::S
        } else if average >= 8.5 {
            Tier::A
        } else if average >= 7.0 {
            Tier::B
        } else if average >= 5.0 {
            Tier::C
        } else if average >= 3.0 {
            Tier::D
        } else {
            Tier::E
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
            Tier::E => "E",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* --------------------------------------------------------------------------
Aggregation
-------------------------------------------------------------------------- */

/// Derived fields of a review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub average: f64,
    pub tier: Tier,
}

/// Round to one decimal place, halves away from zero (8.25 -> 8.3).
pub fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute the average (rounded to one decimal) and tier of a score list.
///
/// Returns `None` for an empty list; a review without tracks has no
/// aggregate.
pub fn aggregate(scores: &[f64]) -> Option<Aggregate> {
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let average = round_to_one_decimal(mean);
    Some(Aggregate {
        average,
        tier: Tier::from_average(average),
    })
}

/* --------------------------------------------------------------------------
Album identity
-------------------------------------------------------------------------- */

/// What a review is about: a catalog album or a user-authored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumRef {
    /// External catalog identifier, stored verbatim.
    Catalog(String),
    /// Locally generated reference, always starting with [`CUSTOM_ALBUM_PREFIX`].
    Custom(String),
}

impl AlbumRef {
    /// Use the caller-supplied catalog id when present, otherwise generate a
    /// fresh custom reference. The catalog id is trusted, not re-fetched.
    pub fn assign(external_id: Option<&str>) -> Self {
        match external_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => AlbumRef::Catalog(id.to_string()),
            None => AlbumRef::Custom(format!("{CUSTOM_ALBUM_PREFIX}{}", uuid::Uuid::new_v4())),
        }
    }

    /// Classify a stored reference by its prefix.
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with(CUSTOM_ALBUM_PREFIX) {
            AlbumRef::Custom(reference.to_string())
        } else {
            AlbumRef::Catalog(reference.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlbumRef::Catalog(id) | AlbumRef::Custom(id) => id,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, AlbumRef::Custom(_))
    }
}

/* --------------------------------------------------------------------------
Submission types
-------------------------------------------------------------------------- */

/// Album part of a review submission.
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub cover: Option<String>,
}

/// One scored track of a review submission.
///
/// `userScore` is kept as raw JSON so both `9.5` and `"9.5"` are accepted and
/// anything else is reported against the track that carried it.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub track_number: i32,
    /// Absent scores deserialize as `null` and fail score validation.
    #[serde(rename = "userScore", default)]
    pub user_score: serde_json::Value,
}

/// A complete review submission as received from a client.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSubmission {
    pub album: AlbumInput,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackInput>,
}

/// A track that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTrack {
    pub spotify_track_id: Option<String>,
    pub track_name: String,
    pub track_number: i32,
    pub score: f64,
}

/// A submission that passed validation, with its identity and aggregate
/// resolved. This is exactly what gets written.
#[derive(Debug, Clone)]
pub struct ValidatedReview {
    pub album_ref: AlbumRef,
    pub album_name: String,
    pub artist_name: String,
    pub cover_url: Option<String>,
    pub review_text: Option<String>,
    pub tracks: Vec<ValidatedTrack>,
    pub aggregate: Aggregate,
}

/* --------------------------------------------------------------------------
Validation
-------------------------------------------------------------------------- */

/// Strip all markup from user-supplied text, keeping the text content.
pub fn sanitize_text(raw: &str) -> String {
    MARKUP_TAG.replace_all(raw, "").trim().to_string()
}

/// Sanitize a review body and enforce the length limit.
///
/// Blank bodies become `None`.
pub fn sanitize_review_text(raw: Option<&str>) -> Result<Option<String>, ReviewError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let clean = sanitize_text(raw);
    let length = clean.chars().count();
    if length > MAX_REVIEW_TEXT_LENGTH {
        return Err(ReviewError::TextTooLong { length });
    }
    Ok(if clean.is_empty() { None } else { Some(clean) })
}

/// Parse a track score from JSON and check it is within bounds.
pub fn parse_score(track: &str, value: &serde_json::Value) -> Result<f64, ReviewError> {
    let invalid = |reason: String| ReviewError::InvalidScore {
        track: track.to_string(),
        reason,
    };

    let score = match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("'{n}' is not a number")))?,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("'{s}' is not a number")))?,
        other => return Err(invalid(format!("'{other}' is not a number"))),
    };

    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(invalid(format!(
            "{score} is outside the range {MIN_SCORE}..={MAX_SCORE}"
        )));
    }
    Ok(score)
}

/// Validate a submission and resolve everything derived from it.
pub fn prepare_review(submission: &ReviewSubmission) -> Result<ValidatedReview, ReviewError> {
    let review_text = sanitize_review_text(submission.review_text.as_deref())?;

    let album = &submission.album;
    if album.name.trim().is_empty() || album.artist.trim().is_empty() {
        return Err(ReviewError::MissingAlbum);
    }
    if submission.tracks.is_empty() {
        return Err(ReviewError::MissingTracks);
    }

    let mut tracks = Vec::with_capacity(submission.tracks.len());
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for input in &submission.tracks {
        if let Some(id) = input.id.as_deref().filter(|id| !id.is_empty()) {
            if !seen_ids.insert(id) {
                return Err(ReviewError::DuplicateTrack {
                    track: input.name.clone(),
                });
            }
        }
        let score = parse_score(&input.name, &input.user_score)?;
        if input.track_number < 1 {
            return Err(ReviewError::InvalidTrackNumber {
                track: input.name.clone(),
                number: input.track_number,
            });
        }
        tracks.push(ValidatedTrack {
            spotify_track_id: input.id.clone().filter(|id| !id.is_empty()),
            track_name: input.name.clone(),
            track_number: input.track_number,
            score,
        });
    }

    let scores: Vec<f64> = tracks.iter().map(|t| t.score).collect();
    let aggregate = aggregate(&scores).ok_or(ReviewError::MissingTracks)?;

    Ok(ValidatedReview {
        album_ref: AlbumRef::assign(album.id.as_deref()),
        album_name: album.name.trim().to_string(),
        artist_name: album.artist.trim().to_string(),
        cover_url: album.cover.clone().filter(|c| !c.is_empty()),
        review_text,
        tracks,
        aggregate,
    })
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
