//! The credential held by an authenticated session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::claims::TokenClaims;

/// Bearer token, its expiry, and its claims.
///
/// Token and claims are always replaced together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque bearer token.
    pub token: String,
    /// Expiration instant.
    pub expires_at: DateTime<Utc>,
    /// Decoded claims.
    pub claims: TokenClaims,
}

impl Credential {
    /// Create a credential.
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>, claims: TokenClaims) -> Self {
        Self {
            token: token.into(),
            expires_at,
            claims,
        }
    }

    /// Whether the administrator claim is set.
    pub fn is_admin(&self) -> bool {
        self.claims.admin
    }

    /// Time left before expiry; negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.expires_at - now
    }

    /// Whether the credential expires within `threshold` of `now`.
    pub fn expires_within(&self, threshold: std::time::Duration, now: DateTime<Utc>) -> bool {
        let threshold = chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::MAX);
        self.remaining(now) <= threshold
    }

    /// Whether the credential has already expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_expires_within_threshold() {
        let now = Utc::now();
        let five_min = Duration::from_secs(300);

        let fresh = Credential::new("t", now + chrono::Duration::minutes(45), TokenClaims::default());
        assert!(!fresh.expires_within(five_min, now));
        assert!(!fresh.is_expired(now));

        let soon = Credential::new("t", now + chrono::Duration::minutes(4), TokenClaims::default());
        assert!(soon.expires_within(five_min, now));

        let gone = Credential::new("t", now - chrono::Duration::seconds(1), TokenClaims::default());
        assert!(gone.is_expired(now));
        assert!(gone.expires_within(five_min, now));
    }
}
