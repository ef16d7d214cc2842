//! Console configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every field carries a default so an absent file still yields a
//! usable configuration.

pub mod api;
pub mod identity;
pub mod logging;
pub mod search;
pub mod session;
pub mod state;

use serde::{Deserialize, Serialize};

pub use self::api::ApiConfig;
pub use self::identity::IdentityConfig;
pub use self::logging::LoggingConfig;
pub use self::search::SearchConfig;
pub use self::session::SessionConfig;
pub use self::state::StateConfig;

use crate::error::AppError;

/// Root console configuration.
///
/// Top-level deserialization target for the merged TOML configuration files
/// (default.toml + environment overlay + `DOCADMIN__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Identity provider settings.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Credential refresh and expiry settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Search and listing settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Persisted client-side state.
    #[serde(default)]
    pub state: StateConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, the `config/{env}` overlay, and environment
    /// variables prefixed with `DOCADMIN__` (e.g. `DOCADMIN__API__BASE_URL`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", Some(&format!("config/{env}")))
    }

    /// Load configuration from an explicit base file and optional overlay.
    pub fn load_from(base: &str, overlay: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(base).required(false));
        if let Some(overlay) = overlay {
            builder = builder.add_source(config::File::with_name(overlay).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("DOCADMIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(base, base_url = %loaded.api.base_url, "Configuration loaded");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_yield_defaults() {
        let config = AppConfig::load_from("does/not/exist", None).unwrap();
        assert_eq!(config.api.default_timeout_seconds, 30);
        assert_eq!(config.api.upload_timeout_seconds, 300);
        assert_eq!(config.session.refresh_interval_minutes, 50);
        assert_eq!(config.session.warning_threshold_minutes, 5);
        assert_eq!(config.search.debounce_ms, 300);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("docadmin-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("custom.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://api.example.org\"\n\n[search]\ndebounce_ms = 150\n",
        )
        .unwrap();

        let base = path.with_extension("");
        let config = AppConfig::load_from(base.to_str().unwrap(), None).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.org");
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.api.default_timeout_seconds, 30);

        std::fs::remove_dir_all(&dir).ok();
    }
}
