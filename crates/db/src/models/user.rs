//! User entity model and DTOs.

use escutas_core::credentials::StoredCredentials;
use escutas_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Carries the catalog credentials -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] or [`UserPublic`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub spotify_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The credential fields as the token manager sees them.
    pub fn credentials(&self) -> StoredCredentials {
        StoredCredentials {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.token_expires_at,
        }
    }
}

/// The caller's own profile.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub spotify_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            spotify_id: user.spotify_id.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Profile fields visible to other users.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UserPublic {
    pub id: DbId,
    pub spotify_id: String,
    pub display_name: Option<String>,
    pub joined_at: Timestamp,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            spotify_id: user.spotify_id.clone(),
            display_name: user.display_name.clone(),
            joined_at: user.created_at,
        }
    }
}

/// Values written on every successful catalog login.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub spotify_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub access_token: String,
    /// `None` keeps the stored refresh token.
    pub refresh_token: Option<String>,
    pub token_expires_at: Timestamp,
}
