//! [`CredentialStore`] backed by the credential columns on `users`.

use async_trait::async_trait;
use escutas_core::credentials::{
    CredentialError, CredentialStore, RefreshedCredentials, StoredCredentials,
};
use escutas_core::types::DbId;

use crate::repositories::UserRepo;
use crate::DbPool;

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn persistence(err: sqlx::Error) -> CredentialError {
    tracing::error!(error = %err, "Credential store query failed");
    CredentialError::Persistence(err.to_string())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn load(&self, user_id: DbId) -> Result<Option<StoredCredentials>, CredentialError> {
        let user = UserRepo::find_by_id(&self.pool, user_id)
            .await
            .map_err(persistence)?;
        Ok(user.map(|u| u.credentials()))
    }

    async fn compare_and_swap(
        &self,
        user_id: DbId,
        expected_refresh_token: &str,
        refreshed: &RefreshedCredentials,
    ) -> Result<bool, CredentialError> {
        UserRepo::swap_credentials(&self.pool, user_id, expected_refresh_token, refreshed)
            .await
            .map_err(persistence)
    }
}
