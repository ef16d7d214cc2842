//! Identity provider configuration.

use serde::{Deserialize, Serialize};

/// Identity provider (Identity Toolkit / Secure Token REST) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Public web API key of the identity project.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the accounts endpoints.
    #[serde(default = "default_accounts_url")]
    pub accounts_url: String,
    /// URL of the token exchange endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Cached tokens closer than this to expiry are refreshed on read.
    #[serde(default = "default_refresh_skew")]
    pub refresh_skew_seconds: i64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            accounts_url: default_accounts_url(),
            token_url: default_token_url(),
            timeout_seconds: default_timeout(),
            refresh_skew_seconds: default_refresh_skew(),
        }
    }
}

fn default_accounts_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_token_url() -> String {
    "https://securetoken.googleapis.com/v1/token".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_refresh_skew() -> i64 {
    300
}
