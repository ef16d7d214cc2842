//! Credential refresh and expiry-warning configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timers owned by the session manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval between forced credential refreshes, in minutes.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u64,
    /// Remaining lifetime below which the credential is "expiring soon", in minutes.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_minutes: u64,
    /// Interval between expiry-flag recomputations, in seconds.
    #[serde(default = "default_expiry_poll")]
    pub expiry_poll_seconds: u64,
}

impl SessionConfig {
    /// Forced refresh interval.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes * 60)
    }

    /// Expiry warning threshold.
    pub fn warning_threshold(&self) -> Duration {
        Duration::from_secs(self.warning_threshold_minutes * 60)
    }

    /// Expiry poll interval.
    pub fn expiry_poll_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_poll_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_minutes: default_refresh_interval(),
            warning_threshold_minutes: default_warning_threshold(),
            expiry_poll_seconds: default_expiry_poll(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    50
}

fn default_warning_threshold() -> u64 {
    5
}

fn default_expiry_poll() -> u64 {
    60
}
