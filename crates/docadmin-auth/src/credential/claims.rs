//! JWT payload decoding.
//!
//! The console never verifies signatures; the remote API does. Claims are
//! only read to derive the administrator flag and the expiry instant.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use docadmin_core::error::{AppError, ErrorKind};
use docadmin_core::result::AppResult;

/// Claims carried in an identity token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Custom administrator claim.
    #[serde(default, deserialize_with = "truthy")]
    pub admin: bool,
    /// Subject (account id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Account email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at, seconds since epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration, seconds since epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Every other claim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Claims for an administrator or a regular account.
    pub fn with_admin(admin: bool) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }

    /// The `exp` claim as an instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Decode the payload of a JWT without verifying its signature or expiry.
pub fn decode_claims(token: &str) -> AppResult<TokenClaims> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::with_source(ErrorKind::Authentication, "Malformed identity token", e))
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "false",
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    })
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &Value) -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_admin_claim() {
        let token = encode_test_token(&json!({
            "sub": "u1",
            "email": "ana@example.com",
            "admin": true,
            "exp": 1_760_000_000,
            "firebase": {"sign_in_provider": "password"}
        }));
        let claims = decode_claims(&token).unwrap();
        assert!(claims.admin);
        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_760_000_000);
        assert!(claims.extra.contains_key("firebase"));
    }

    #[test]
    fn test_missing_admin_claim_is_false() {
        let token = encode_test_token(&json!({"sub": "u2"}));
        assert!(!decode_claims(&token).unwrap().admin);

        let token = encode_test_token(&json!({"sub": "u2", "admin": 1}));
        assert!(decode_claims(&token).unwrap().admin);
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(decode_claims("not-a-jwt").is_err());
        assert!(decode_claims("a.b").is_err());
        assert!(decode_claims("a.!!!.c").is_err());

        let err = decode_claims("not-a-jwt").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let token = encode_test_token(&json!({"sub": "u3", "exp": 1, "aud": "other-project"}));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u3"));
        assert_eq!(claims.exp, Some(1));
    }
}
