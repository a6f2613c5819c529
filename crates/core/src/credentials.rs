//! Token lifecycle management for the delegated catalog credential.
//!
//! [`TokenManager::get_valid_credential`] hands out an access token that is
//! good for at least [`REFRESH_WINDOW_SECS`] more seconds, refreshing and
//! persisting a new one when needed. Storage and the authorization server sit
//! behind the [`CredentialStore`] and [`TokenRefresher`] traits.
//!
//! Refreshes for one user are single-flight: concurrent callers queue on a
//! per-user lock, and whoever gets it second re-reads the store and reuses the
//! first caller's result instead of spending the refresh token again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// A credential expiring sooner than this is refreshed before use.
pub const REFRESH_WINDOW_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Credential fields as persisted on a user row. All optional until the user
/// completes the authorization flow once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<Timestamp>,
}

impl StoredCredentials {
    /// Whether the access token must be refreshed before use at `now`.
    ///
    /// A missing expiry is treated as already expired.
    pub fn needs_refresh(&self, now: Timestamp) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - now < Duration::seconds(REFRESH_WINDOW_SECS),
            None => true,
        }
    }

    fn pair(&self) -> Result<(&str, &str), CredentialError> {
        match (self.access_token.as_deref(), self.refresh_token.as_deref()) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Ok((access, refresh))
            }
            _ => Err(CredentialError::Unauthenticated),
        }
    }
}

/// What the authorization server returns for a token grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Only present when the server rotates the refresh token.
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
}

impl TokenGrant {
    /// Absolute expiry of the granted access token.
    pub fn expires_at(&self, now: Timestamp) -> Timestamp {
        now + Duration::seconds(self.expires_in)
    }
}

/// New credential values to persist after a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedCredentials {
    pub access_token: String,
    /// `None` keeps the stored refresh token.
    pub refresh_token: Option<String>,
    pub expires_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// No usable credential pair; the user has to authorize again.
    #[error("Catalog session is missing. Please log in again")]
    Unauthenticated,

    /// The authorization server refused or could not be reached.
    #[error("Catalog credential refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Credential store failure: {0}")]
    Persistence(String),
}

impl From<CredentialError> for CoreError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Unauthenticated => CoreError::Unauthorized(err.to_string()),
            CredentialError::RefreshFailed(_) => CoreError::Unauthorized(
                "Catalog session expired. Please log in again".to_string(),
            ),
            CredentialError::Persistence(msg) => CoreError::Internal(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Persistent home of each user's credential fields.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the current credential fields, or `None` if the user is unknown.
    async fn load(&self, user_id: DbId) -> Result<Option<StoredCredentials>, CredentialError>;

    /// Persist refreshed credentials, but only if the stored refresh token is
    /// still `expected_refresh_token`.
    ///
    /// Returns `false` when the swap lost to another writer.
    async fn compare_and_swap(
        &self,
        user_id: DbId,
        expected_refresh_token: &str,
        refreshed: &RefreshedCredentials,
    ) -> Result<bool, CredentialError>;
}

/// The authorization server's refresh operation.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, CredentialError>;
}

// ---------------------------------------------------------------------------
// Per-user locks
// ---------------------------------------------------------------------------

/// Map of per-user async mutexes. Entries nobody holds are pruned on the
/// next acquisition.
#[derive(Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<DbId, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    async fn acquire(&self, key: DbId) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Hands out valid access tokens, refreshing them transparently.
pub struct TokenManager {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    locks: KeyedLocks,
}

impl TokenManager {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            locks: KeyedLocks::default(),
        }
    }

    /// Return an access token valid for at least [`REFRESH_WINDOW_SECS`].
    ///
    /// `current` is the credential state the caller already holds (usually
    /// the user row loaded for the request). The fast path takes no lock and
    /// makes no call.
    pub async fn get_valid_credential(
        &self,
        user_id: DbId,
        current: &StoredCredentials,
    ) -> Result<String, CredentialError> {
        let (access, _) = current.pair()?;
        if !current.needs_refresh(Utc::now()) {
            return Ok(access.to_string());
        }

        let _guard = self.locks.acquire(user_id).await;

        // Another request may have refreshed while we waited for the lock.
        let latest = self
            .store
            .load(user_id)
            .await?
            .ok_or(CredentialError::Unauthenticated)?;
        let (access, refresh) = latest.pair()?;
        let now = Utc::now();
        if !latest.needs_refresh(now) {
            return Ok(access.to_string());
        }

        tracing::info!(%user_id, "Refreshing catalog access token");
        let grant = self.refresher.refresh(refresh).await.map_err(|e| {
            tracing::warn!(%user_id, error = %e, "Catalog token refresh failed");
            match e {
                CredentialError::RefreshFailed(_) => e,
                other => CredentialError::RefreshFailed(other.to_string()),
            }
        })?;

        let refreshed = RefreshedCredentials {
            expires_at: grant.expires_at(now),
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
        };

        if self
            .store
            .compare_and_swap(user_id, refresh, &refreshed)
            .await?
        {
            return Ok(refreshed.access_token);
        }

        // Lost the swap to a writer outside this process; never overwrite a
        // newer pair, use it if it is good.
        tracing::warn!(%user_id, "Credential changed during refresh, using stored value");
        let stored = self
            .store
            .load(user_id)
            .await?
            .ok_or(CredentialError::Unauthenticated)?;
        let (access, _) = stored.pair()?;
        if stored.needs_refresh(Utc::now()) {
            return Err(CredentialError::RefreshFailed(
                "credential was replaced concurrently".to_string(),
            ));
        }
        Ok(access.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
