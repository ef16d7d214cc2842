//! Identity provider abstraction.
//!
//! The session manager only talks to the provider through
//! [`IdentityProvider`]; the concrete REST implementation lives in
//! [`firebase`].

pub mod error;
pub mod firebase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::credential::Credential;

pub use error::{ProviderError, auth_error_message, codes};
pub use firebase::FirebaseIdentityProvider;

/// Account as seen by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    /// Provider account id.
    pub uid: String,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Profile fields applied through the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name.
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// New avatar URL.
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    /// Update only the display name.
    pub fn display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Names of the fields this update sets.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.display_name.is_some() {
            names.push("displayName");
        }
        if self.photo_url.is_some() {
            names.push("photoURL");
        }
        names
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}

/// Third-party identity service.
///
/// Implementations publish the signed-in account on the channel returned
/// by [`subscribe`](IdentityProvider::subscribe): `Some` after sign-in,
/// sign-up or session restore, `None` after sign-out or invalidation.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Create an account and sign it in.
    async fn create_account(&self, email: &str, password: &str)
    -> Result<ProviderUser, ProviderError>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, ProviderError>;

    /// End the provider session.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Current identity token, bypassing any cache when `force_refresh`.
    async fn get_token(&self, force_refresh: bool) -> Result<String, ProviderError>;

    /// Current identity token together with its expiry and decoded claims.
    async fn get_token_claims(&self, force_refresh: bool) -> Result<Credential, ProviderError>;

    /// Session-change stream.
    fn subscribe(&self) -> watch::Receiver<Option<ProviderUser>>;

    /// Apply profile fields to the signed-in account.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProviderUser, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_field_names() {
        let update = ProfileUpdate::display_name("Ana");
        assert_eq!(update.field_names(), vec!["displayName"]);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"displayName": "Ana"})
        );
        assert!(ProfileUpdate::default().is_empty());
    }
}
