//! Search and listing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Debounce and page-size settings for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Debounce delay applied to remote-backed search input, in milliseconds.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    /// Page size for public library listings.
    #[serde(default = "default_library_page_size")]
    pub library_page_size: u32,
    /// Number of audit entries requested per fetch.
    #[serde(default = "default_audit_limit")]
    pub audit_log_limit: u32,
}

impl SearchConfig {
    /// Debounce delay as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            library_page_size: default_library_page_size(),
            audit_log_limit: default_audit_limit(),
        }
    }
}

fn default_debounce() -> u64 {
    300
}

fn default_library_page_size() -> u32 {
    20
}

fn default_audit_limit() -> u32 {
    200
}
