//! Handlers for the `/blog` resource.
//!
//! Posts can mention tracks as `spotify:track:<id>`; their catalog metadata
//! is captured when the post is written so readers never hit Spotify.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use escutas_core::blog::{
    extract_track_ids, published_at_after, validate_input, CreatePost, PostStatus, TrackSnapshot,
    UpdatePost,
};
use escutas_core::error::CoreError;
use escutas_core::history::PageMeta;
use escutas_core::types::DbId;
use escutas_db::models::post::{BlogPost, BlogPostChanges, BlogPostSummary, NewBlogPost};
use escutas_db::models::user::User;
use escutas_db::repositories::{PostRepo, ReviewRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::state::AppState;

/// GET /api/blog
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PaginatedResponse<BlogPostSummary>>> {
    let page = params.page_request();
    let total = PostRepo::count_published(&state.pool).await?;
    let posts = PostRepo::list_published(&state.pool, page).await?;
    Ok(Json(PaginatedResponse::new(posts, PageMeta::new(page, total))))
}

/// GET /api/blog/{slug}
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let post = PostRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post '{slug}' not found")))?;
    Ok(Json(ApiResponse::ok(post)))
}

/// POST /api/blog
///
/// Creates a draft. A duplicate slug is rejected with 409 by the unique
/// constraint.
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreatePost>,
) -> AppResult<(StatusCode, Json<ApiResponse<BlogPost>>)> {
    validate_input(&input)?;

    if let Some(review_id) = input.related_review_id {
        if !ReviewRepo::is_owned_by(&state.pool, review_id, auth.user_id).await? {
            return Err(CoreError::Validation(
                "related_review_id must reference one of your reviews".into(),
            )
            .into());
        }
    }

    let track_metadata = track_snapshot(&state, &auth.user, &input.content).await;

    let post = PostRepo::create(
        &state.pool,
        &NewBlogPost {
            author_id: auth.user_id,
            related_review_id: input.related_review_id,
            title: input.title,
            slug: input.slug,
            summary: input.summary,
            content: input.content,
            cover_image: input.cover_image,
            track_metadata,
        },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, post_id = %post.id, slug = %post.slug, "Blog post created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Post created", post)),
    ))
}

/// PUT /api/blog/{id}
///
/// Partial update by the author. Track metadata is captured again only when
/// the content changes.
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdatePost>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    validate_input(&input)?;

    let not_found = || CoreError::NotFound {
        entity: "BlogPost",
        id,
    };
    let post = PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    if post.author_id != auth.user_id {
        return Err(CoreError::Forbidden("Only the author can edit this post".into()).into());
    }

    let status = input
        .status
        .as_deref()
        .map(str::parse::<PostStatus>)
        .transpose()?;

    let track_metadata = match input.content.as_deref() {
        Some(content) if content != post.content => {
            Some(track_snapshot(&state, &auth.user, content).await)
        }
        _ => None,
    };

    let changes = BlogPostChanges {
        title: input.title,
        slug: input.slug,
        summary: input.summary,
        content: input.content,
        cover_image: input.cover_image,
        track_metadata,
        status,
        published_at: status.and_then(|s| published_at_after(s, post.published_at, Utc::now())),
    };

    let updated = PostRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(user_id = %auth.user_id, post_id = %id, status = %updated.status, "Blog post updated");

    Ok(Json(ApiResponse::with_message("Post updated", updated)))
}

/// Catalog metadata for every track mentioned in `content`.
///
/// Any failure is logged and yields an empty snapshot; a post is never
/// rejected because Spotify is unavailable.
async fn track_snapshot(state: &AppState, author: &User, content: &str) -> TrackSnapshot {
    let ids = extract_track_ids(content);
    if ids.is_empty() {
        return TrackSnapshot::new();
    }

    let token = match state.spotify_token(author).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(user_id = %author.id, error = %e, "No Spotify token for track metadata");
            return TrackSnapshot::new();
        }
    };

    match state.spotify.tracks(&token, &ids).await {
        Ok(tracks) => tracks
            .iter()
            .filter_map(|t| Some((t.id.clone()?, t.metadata())))
            .collect(),
        Err(e) => {
            tracing::warn!(user_id = %author.id, error = %e, "Failed to fetch track metadata");
            TrackSnapshot::new()
        }
    }
}
