//! Token store backed by persisted client state.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

use docadmin_client::state::keys;
use docadmin_core::result::AppResult;
use docadmin_core::traits::KeyValueStore;

use crate::credential::{Credential, TokenClaims};

/// Persists the current credential under `idToken`, `userClaims` and
/// `tokenExpiresAt`.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish()
    }
}

impl TokenStore {
    /// Wrap a key/value store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The underlying key/value store.
    pub fn inner(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// Persist a credential. Token, claims and expiry are written together.
    pub async fn set(&self, credential: &Credential) -> AppResult<()> {
        let claims = serde_json::to_string(&credential.claims)?;
        let expires_at = credential
            .expires_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        self.store.set(keys::ID_TOKEN, &credential.token).await?;
        self.store.set(keys::USER_CLAIMS, &claims).await?;
        self.store.set(keys::TOKEN_EXPIRES_AT, &expires_at).await?;
        debug!(expires_at = %expires_at, "Credential persisted");
        Ok(())
    }

    /// Load the persisted credential.
    ///
    /// Partial or unreadable entries yield `None`.
    pub async fn get(&self) -> AppResult<Option<Credential>> {
        let Some(token) = self.store.get(keys::ID_TOKEN).await? else {
            return Ok(None);
        };
        if !keys::is_usable_token(&token) {
            return Ok(None);
        }

        let expires_at = match self.store.get(keys::TOKEN_EXPIRES_AT).await? {
            Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
                Ok(at) => at.with_timezone(&Utc),
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable persisted expiry");
                    return Ok(None);
                }
            },
            None => return Ok(None),
        };

        let claims = match self.store.get(keys::USER_CLAIMS).await? {
            Some(raw) => serde_json::from_str::<TokenClaims>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable persisted claims");
                TokenClaims::default()
            }),
            None => TokenClaims::default(),
        };

        Ok(Some(Credential::new(token, expires_at, claims)))
    }

    /// Remove the persisted credential.
    pub async fn clear(&self) -> AppResult<()> {
        self.store
            .remove_many(&[keys::ID_TOKEN, keys::USER_CLAIMS, keys::TOKEN_EXPIRES_AT])
            .await
    }
}
