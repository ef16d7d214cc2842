//! Provider error codes and their user-facing messages.

use thiserror::Error;

use docadmin_core::error::{AppError, ErrorKind};

/// Stable provider error codes.
pub mod codes {
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    pub const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    pub const USER_DISABLED: &str = "auth/user-disabled";
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";
    pub const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
    pub const NO_CURRENT_USER: &str = "auth/no-current-user";
    pub const TOKEN_EXPIRED: &str = "auth/user-token-expired";
    pub const INTERNAL_ERROR: &str = "auth/internal-error";
}

/// Error reported by the identity provider.
///
/// `code` is machine-readable and goes into audit events; `message` is the
/// provider's own text and is only shown when the code is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    /// Error code, e.g. `auth/wrong-password`.
    pub code: String,
    /// Provider message.
    pub message: String,
}

impl ProviderError {
    /// Create a provider error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The request never reached the provider.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_REQUEST_FAILED, message)
    }

    /// No account is signed in.
    pub fn no_current_user() -> Self {
        Self::new(codes::NO_CURRENT_USER, "")
    }
}

/// User-facing message for a provider error.
pub fn auth_error_message(err: &ProviderError) -> String {
    let fixed = match err.code.as_str() {
        codes::USER_NOT_FOUND => "User not found",
        codes::WRONG_PASSWORD => "Incorrect password",
        codes::EMAIL_ALREADY_IN_USE => "Email already in use",
        codes::WEAK_PASSWORD => "Weak password",
        codes::INVALID_EMAIL => "Invalid email",
        codes::USER_DISABLED => "Account disabled",
        codes::TOO_MANY_REQUESTS => "Too many attempts. Try again later",
        codes::NETWORK_REQUEST_FAILED => "Network error",
        _ if !err.message.is_empty() => return err.message.clone(),
        _ => "Unknown error",
    };
    fixed.to_string()
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        let kind = if err.code == codes::NETWORK_REQUEST_FAILED {
            ErrorKind::Network
        } else {
            ErrorKind::Authentication
        };
        AppError::with_source(kind, auth_error_message(&err), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_use_fixed_messages() {
        let cases = [
            (codes::USER_NOT_FOUND, "User not found"),
            (codes::WRONG_PASSWORD, "Incorrect password"),
            (codes::EMAIL_ALREADY_IN_USE, "Email already in use"),
            (codes::WEAK_PASSWORD, "Weak password"),
            (codes::INVALID_EMAIL, "Invalid email"),
            (codes::USER_DISABLED, "Account disabled"),
            (codes::TOO_MANY_REQUESTS, "Too many attempts. Try again later"),
            (codes::NETWORK_REQUEST_FAILED, "Network error"),
        ];
        for (code, expected) in cases {
            let err = ProviderError::new(code, "raw provider text");
            assert_eq!(auth_error_message(&err), expected, "{code}");
        }
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let err = ProviderError::new("auth/quota-exceeded", "Quota exceeded");
        assert_eq!(auth_error_message(&err), "Quota exceeded");

        let err = ProviderError::new("auth/quota-exceeded", "");
        assert_eq!(auth_error_message(&err), "Unknown error");
    }

    #[test]
    fn test_into_app_error() {
        let err: AppError = ProviderError::new(codes::WRONG_PASSWORD, "x").into();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Incorrect password");

        let err: AppError = ProviderError::network("offline").into();
        assert_eq!(err.kind, ErrorKind::Network);
    }
}
