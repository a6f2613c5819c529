//! Blog post validation, status lifecycle and track reference extraction.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

pub const MIN_TITLE_LENGTH: u64 = 5;
pub const MAX_TITLE_LENGTH: u64 = 255;
pub const MIN_SLUG_LENGTH: u64 = 5;
pub const MAX_SLUG_LENGTH: u64 = 255;
pub const MAX_SUMMARY_LENGTH: u64 = 500;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

static TRACK_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"spotify:track:([a-zA-Z0-9]{22})").expect("valid regex"));

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Archived => "ARCHIVED",
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            "ARCHIVED" => Ok(Self::Archived),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: DRAFT, PUBLISHED, ARCHIVED"
            ))),
        }
    }
}

/// `published_at` after a status change.
///
/// Set the first time a post becomes published and kept from then on, even
/// if the post is later archived or drafted again.
pub fn published_at_after(
    new_status: PostStatus,
    published_at: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    match (new_status, published_at) {
        (_, Some(at)) => Some(at),
        (PostStatus::Published, None) => Some(now),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(ValidationError::new("slug")
            .with_message("must contain only lowercase letters, digits and single hyphens".into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePost {
    #[validate(length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH))]
    pub title: String,
    #[validate(
        length(min = MIN_SLUG_LENGTH, max = MAX_SLUG_LENGTH),
        custom(function = "validate_slug")
    )]
    pub slug: String,
    #[validate(length(max = MAX_SUMMARY_LENGTH))]
    pub summary: Option<String>,
    #[validate(length(min = 1))]
    pub content: String,
    pub cover_image: Option<String>,
    pub related_review_id: Option<DbId>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePost {
    #[validate(length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH))]
    pub title: Option<String>,
    #[validate(
        length(min = MIN_SLUG_LENGTH, max = MAX_SLUG_LENGTH),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,
    #[validate(length(max = MAX_SUMMARY_LENGTH))]
    pub summary: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<String>,
}

/// Run derive-based validation and flatten the result into a [`CoreError`].
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(|e| CoreError::Validation(describe(&e)))
}

fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| match errs.first() {
                    Some(e) if e.code == "length" => "has an invalid length".to_string(),
                    Some(e) => format!("is invalid ({})", e.code),
                    None => "is invalid".to_string(),
                });
            format!("{field} {reason}")
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

// ---------------------------------------------------------------------------
// Track references
// ---------------------------------------------------------------------------

/// Catalog metadata captured for a track referenced in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub cover_url: Option<String>,
    pub preview_url: Option<String>,
}

/// Track id to metadata, as stored on the post.
pub type TrackSnapshot = BTreeMap<String, TrackMetadata>;

/// Unique `spotify:track:<id>` ids in `content`, in order of first mention.
pub fn extract_track_ids(content: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for cap in TRACK_URI_RE.captures_iter(content) {
        let id = &cap[1];
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
