//! Repository for the `users` table.

use escutas_core::credentials::RefreshedCredentials;
use escutas_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{UpsertUser, User, UserPublic};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, spotify_id, display_name, email, access_token, refresh_token, \
                       token_expires_at, created_at, updated_at";

const PUBLIC_COLUMNS: &str = "id, spotify_id, display_name, created_at AS joined_at";

/// Most rows a user search returns.
pub const SEARCH_LIMIT: i64 = 20;

/// Provides lookup, login upsert and credential updates for users.
pub struct UserRepo;

impl UserRepo {
    /// Create the user on first login, or refresh profile and credentials on
    /// later ones. A missing refresh token keeps the stored one.
    pub async fn upsert_by_spotify_id(
        pool: &PgPool,
        input: &UpsertUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (spotify_id, display_name, email, access_token, refresh_token, token_expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (spotify_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                access_token = EXCLUDED.access_token,
                refresh_token = COALESCE(EXCLUDED.refresh_token, users.refresh_token),
                token_expires_at = EXCLUDED.token_expires_at,
                updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.spotify_id)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(&input.access_token)
            .bind(&input.refresh_token)
            .bind(input.token_expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the public profile of a user.
    pub async fn find_public(pool: &PgPool, id: DbId) -> Result<Option<UserPublic>, sqlx::Error> {
        let query = format!("SELECT {PUBLIC_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserPublic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a user with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Case-insensitive partial match on display name, or exact catalog id.
    ///
    /// `term` is matched literally; `%` and `_` carry no wildcard meaning.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<UserPublic>, sqlx::Error> {
        let query = format!(
            "SELECT {PUBLIC_COLUMNS} FROM users
             WHERE display_name ILIKE $1 ESCAPE '\\' OR spotify_id = $2
             ORDER BY display_name NULLS LAST, created_at
             LIMIT $3"
        );
        sqlx::query_as::<_, UserPublic>(&query)
            .bind(format!("%{}%", escape_like(term)))
            .bind(term)
            .bind(SEARCH_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Store refreshed credentials if the row still holds
    /// `expected_refresh_token`.
    ///
    /// Returns `false` when another writer replaced the pair first.
    pub async fn swap_credentials(
        pool: &PgPool,
        id: DbId,
        expected_refresh_token: &str,
        refreshed: &RefreshedCredentials,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                access_token = $3,
                refresh_token = COALESCE($4, refresh_token),
                token_expires_at = $5,
                updated_at = now()
             WHERE id = $1 AND refresh_token = $2",
        )
        .bind(id)
        .bind(expected_refresh_token)
        .bind(&refreshed.access_token)
        .bind(&refreshed.refresh_token)
        .bind(refreshed.expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
