//! Session data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::credential::Credential;
use crate::provider::{ProfileUpdate, ProviderUser};

/// An authenticated principal with its current credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// Signed-in account.
    pub user: ProviderUser,
    /// Current credential.
    pub credential: Credential,
}

impl Session {
    /// Account id.
    pub fn uid(&self) -> &str {
        &self.user.uid
    }

    /// Account email, if known.
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }

    /// Whether the credential carries the administrator claim.
    pub fn is_admin(&self) -> bool {
        self.credential.is_admin()
    }
}

/// Optional profile fields applied when an account is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupProfile {
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SignupProfile {
    pub(crate) fn as_update(&self) -> Option<ProfileUpdate> {
        self.display_name
            .as_ref()
            .filter(|name| !name.trim().is_empty())
            .map(ProfileUpdate::display_name)
    }
}

/// Mutable state behind the manager.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) session: Option<Session>,
    pub(crate) profile: Option<Map<String, Value>>,
    pub(crate) token_expiring: bool,
    pub(crate) last_error: Option<String>,
}

impl SessionState {
    /// Drop everything tied to the signed-in principal.
    pub(crate) fn reset(&mut self) {
        self.session = None;
        self.profile = None;
        self.token_expiring = false;
    }
}
