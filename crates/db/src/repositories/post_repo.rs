//! Repository for the `blog_posts` table.

use escutas_core::blog::PostStatus;
use escutas_core::history::PageRequest;
use escutas_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::post::{BlogPost, BlogPostChanges, BlogPostSummary, NewBlogPost};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, author_id, related_review_id, title, slug, summary, content, \
                       cover_image, track_metadata, status, created_at, updated_at, published_at";

const SUMMARY_COLUMNS: &str =
    "id, author_id, title, slug, summary, cover_image, published_at, created_at";

/// Provides CRUD operations for blog posts.
pub struct PostRepo;

impl PostRepo {
    /// Insert a new post as a draft.
    pub async fn create(pool: &PgPool, input: &NewBlogPost) -> Result<BlogPost, sqlx::Error> {
        let query = format!(
            "INSERT INTO blog_posts
                (author_id, related_review_id, title, slug, summary, content, cover_image,
                 track_metadata, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(input.author_id)
            .bind(input.related_review_id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.summary)
            .bind(&input.content)
            .bind(&input.cover_image)
            .bind(Json(&input.track_metadata))
            .bind(PostStatus::Draft.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a post by ID regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blog_posts WHERE id = $1");
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a published post by slug.
    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blog_posts WHERE slug = $1 AND status = $2");
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(slug)
            .bind(PostStatus::Published.as_str())
            .fetch_optional(pool)
            .await
    }

    /// One page of published posts, newest first.
    pub async fn list_published(
        pool: &PgPool,
        page: PageRequest,
    ) -> Result<Vec<BlogPostSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM blog_posts
             WHERE status = $1
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, BlogPostSummary>(&query)
            .bind(PostStatus::Published.as_str())
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Total number of published posts.
    pub async fn count_published(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog_posts WHERE status = $1")
            .bind(PostStatus::Published.as_str())
            .fetch_one(pool)
            .await
    }

    /// Apply `changes`. Only non-`None` fields are written.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &BlogPostChanges,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!(
            "UPDATE blog_posts SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                summary = COALESCE($4, summary),
                content = COALESCE($5, content),
                cover_image = COALESCE($6, cover_image),
                track_metadata = COALESCE($7, track_metadata),
                status = COALESCE($8, status),
                published_at = COALESCE(published_at, $9),
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.slug)
            .bind(&changes.summary)
            .bind(&changes.content)
            .bind(&changes.cover_image)
            .bind(changes.track_metadata.as_ref().map(Json))
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.published_at)
            .fetch_optional(pool)
            .await
    }
}
