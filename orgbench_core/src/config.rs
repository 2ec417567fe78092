use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::storage::StoreError;

/// App-level settings the remote service needs beyond per-environment
/// credentials: the connected-app pair the token endpoint requires, the
/// API version for query URLs, and how long an authentication is trusted
/// before a record counts as stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,
}

fn default_api_version() -> String {
    "v59.0".to_string()
}

fn default_session_ttl_minutes() -> i64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_version: default_api_version(),
            session_ttl_minutes: default_session_ttl_minutes(),
        }
    }
}

const CONFIG_FILE: &str = "config.json";

impl AppConfig {
    /// Load from the config dir; a missing file yields the defaults.
    pub fn load_default() -> Result<Self, StoreError> {
        let proj = ProjectDirs::from("", "", "orgbench").ok_or(StoreError::NoConfigDir)?;
        Self::load_from(proj.config_dir().join(CONFIG_FILE))
    }

    pub fn load_from(path: PathBuf) -> Result<Self, StoreError> {
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }
}
