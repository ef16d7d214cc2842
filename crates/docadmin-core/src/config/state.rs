//! Persisted client-side state configuration.

use serde::{Deserialize, Serialize};

/// Where the console keeps its key/value session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path of the JSON state file.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/session.json".to_string()
}
