//! Repository for `album_reviews` and their `track_reviews`.

use std::collections::HashMap;

use escutas_core::history::{PageRequest, ReviewFilters};
use escutas_core::review::ValidatedReview;
use escutas_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::review::{AlbumReview, AlbumReviewWithTracks, ReviewSummary, TrackReview};

/// Column list for `album_reviews` queries.
const COLUMNS: &str = "id, user_id, album_id, album_name, artist_name, cover_url, review_text, \
                       average_score, tier, created_at";

/// Column list for `track_reviews` queries.
const TRACK_COLUMNS: &str =
    "id, album_review_id, spotify_track_id, track_name, track_number, score";

const SUMMARY_COLUMNS: &str =
    "id, album_id, album_name, artist_name, cover_url, average_score, tier, created_at";

/// Shared WHERE clause for history listing and counting.
///
/// `$1` user, `$2` album reference, `$3` inclusive lower bound, `$4`
/// exclusive upper bound. Null parameters disable their filter.
const HISTORY_FILTER: &str = "user_id = $1 \
     AND ($2::TEXT IS NULL OR album_id = $2) \
     AND ($3::TIMESTAMPTZ IS NULL OR created_at >= $3) \
     AND ($4::TIMESTAMPTZ IS NULL OR created_at < $4)";

/// Provides persistence and history queries for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a validated review and all of its tracks in one transaction.
    ///
    /// Nothing is written if any insert fails.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &ValidatedReview,
    ) -> Result<AlbumReviewWithTracks, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO album_reviews
                (user_id, album_id, album_name, artist_name, cover_url, review_text,
                 average_score, tier)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, AlbumReview>(&query)
            .bind(user_id)
            .bind(input.album_ref.as_str())
            .bind(&input.album_name)
            .bind(&input.artist_name)
            .bind(&input.cover_url)
            .bind(&input.review_text)
            .bind(input.aggregate.average)
            .bind(input.aggregate.tier.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let track_query = format!(
            "INSERT INTO track_reviews
                (album_review_id, spotify_track_id, track_name, track_number, score)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TRACK_COLUMNS}"
        );
        let mut tracks = Vec::with_capacity(input.tracks.len());
        for track in &input.tracks {
            let row = sqlx::query_as::<_, TrackReview>(&track_query)
                .bind(review.id)
                .bind(&track.spotify_track_id)
                .bind(&track.track_name)
                .bind(track.track_number)
                .bind(track.score)
                .fetch_one(&mut *tx)
                .await?;
            tracks.push(row);
        }

        tx.commit().await?;

        tracks.sort_by_key(|t| t.track_number);
        Ok(AlbumReviewWithTracks { review, tracks })
    }

    /// Find a review and its tracks by ID.
    pub async fn find_with_tracks(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AlbumReviewWithTracks>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM album_reviews WHERE id = $1");
        let Some(review) = sqlx::query_as::<_, AlbumReview>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let mut with_tracks = Self::attach_tracks(pool, vec![review]).await?;
        Ok(with_tracks.pop())
    }

    /// One page of a user's reviews, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<AlbumReviewWithTracks>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM album_reviews
             WHERE {HISTORY_FILTER}
             ORDER BY created_at DESC, id
             LIMIT $5 OFFSET $6"
        );
        let reviews = sqlx::query_as::<_, AlbumReview>(&query)
            .bind(user_id)
            .bind(filters.album_id.as_deref())
            .bind(filters.created_from())
            .bind(filters.created_before())
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Self::attach_tracks(pool, reviews).await
    }

    /// Number of a user's reviews matching `filters`.
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        filters: &ReviewFilters,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM album_reviews WHERE {HISTORY_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(user_id)
            .bind(filters.album_id.as_deref())
            .bind(filters.created_from())
            .bind(filters.created_before())
            .fetch_one(pool)
            .await
    }

    /// Summaries of a user's reviews created in `[start, end)`, newest first.
    pub async fn list_between(
        pool: &PgPool,
        user_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<ReviewSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM album_reviews
             WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ReviewSummary>(&query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// Whether `review_id` exists and belongs to `user_id`.
    pub async fn is_owned_by(
        pool: &PgPool,
        review_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM album_reviews WHERE id = $1 AND user_id = $2)",
        )
        .bind(review_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Load the tracks of `reviews` in one query, keeping the review order.
    async fn attach_tracks(
        pool: &PgPool,
        reviews: Vec<AlbumReview>,
    ) -> Result<Vec<AlbumReviewWithTracks>, sqlx::Error> {
        if reviews.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<DbId> = reviews.iter().map(|r| r.id).collect();
        let query = format!(
            "SELECT {TRACK_COLUMNS} FROM track_reviews
             WHERE album_review_id = ANY($1)
             ORDER BY track_number, id"
        );
        let rows = sqlx::query_as::<_, TrackReview>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut by_review: HashMap<DbId, Vec<TrackReview>> = HashMap::new();
        for track in rows {
            by_review.entry(track.album_review_id).or_default().push(track);
        }

        Ok(reviews
            .into_iter()
            .map(|review| AlbumReviewWithTracks {
                tracks: by_review.remove(&review.id).unwrap_or_default(),
                review,
            })
            .collect())
    }
}
