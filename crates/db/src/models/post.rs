//! Blog post model and DTOs.

use escutas_core::blog::{PostStatus, TrackSnapshot};
use escutas_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from `blog_posts`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlogPost {
    pub id: DbId,
    pub author_id: DbId,
    pub related_review_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub track_metadata: Json<TrackSnapshot>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub published_at: Option<Timestamp>,
}

/// Listing entry for the public post index (no body).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlogPostSummary {
    pub id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub cover_image: Option<String>,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Fully resolved insert.
#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub author_id: DbId,
    pub related_review_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub track_metadata: TrackSnapshot,
}

/// Fully resolved update. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct BlogPostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub track_metadata: Option<TrackSnapshot>,
    pub status: Option<PostStatus>,
    pub published_at: Option<Timestamp>,
}
