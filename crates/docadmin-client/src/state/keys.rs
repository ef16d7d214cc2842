//! Well-known persisted state keys.

/// Current bearer token.
pub const ID_TOKEN: &str = "idToken";
/// JSON-encoded token claims.
pub const USER_CLAIMS: &str = "userClaims";
/// JSON-encoded cached profile.
pub const USER_PROFILE: &str = "userProfile";
/// JSON-encoded signed-in principal.
pub const USER: &str = "user";
/// Credential expiry instant (RFC 3339).
pub const TOKEN_EXPIRES_AT: &str = "tokenExpiresAt";

/// Keys removed whenever the credential is cleared.
pub const SESSION_KEYS: [&str; 4] = [ID_TOKEN, USER_CLAIMS, USER_PROFILE, USER];

/// Whether a persisted token value is usable.
///
/// Older front-ends stringified missing tokens, so `"null"` and
/// `"undefined"` are treated as absent.
pub fn is_usable_token(value: &str) -> bool {
    !value.is_empty() && value != "null" && value != "undefined"
}
