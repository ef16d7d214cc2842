//! Remote API configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the HTTP client adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote API (no trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for ordinary requests in seconds.
    #[serde(default = "default_timeout")]
    pub default_timeout_seconds: u64,
    /// Timeout for uploads and downloads in seconds.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_seconds: u64,
    /// Timeout for the health probe in seconds.
    #[serde(default = "default_health_timeout")]
    pub health_timeout_seconds: u64,
    /// Path of the sign-in entry point used for session-expiry redirects.
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,
}

impl ApiConfig {
    /// Default request timeout.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_seconds)
    }

    /// Extended timeout for large transfers.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_seconds)
    }

    /// Health probe timeout.
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_timeout_seconds: default_timeout(),
            upload_timeout_seconds: default_upload_timeout(),
            health_timeout_seconds: default_health_timeout(),
            sign_in_path: default_sign_in_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_upload_timeout() -> u64 {
    300
}

fn default_health_timeout() -> u64 {
    5
}

fn default_sign_in_path() -> String {
    "/login".to_string()
}
