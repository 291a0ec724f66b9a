//! Configuration structures
//!
//! Files may use either the `snake_case` field names below or the `PascalCase`
//! `AppSettings` layout (`{"AppSettings": {"AuthClientId": ...}}`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_KEY_FILE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STATE_FILE, DEFAULT_SYNC_INTERVAL_SECS,
};
use crate::errors::{Result, SkySyncError};

pub const DEFAULT_AUTH_BASE_URI: &str = "https://oauth2.sky.blackbaud.com";
pub const DEFAULT_SKY_API_BASE_URI: &str = "https://api.sky.blackbaud.com";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "AppSettings")]
    pub sky: SkyApiConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

/// Remote endpoints and application credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyApiConfig {
    #[serde(alias = "AuthBaseUri")]
    pub auth_base_uri: String,
    #[serde(alias = "AuthClientId")]
    pub auth_client_id: String,
    #[serde(alias = "AuthClientSecret")]
    pub auth_client_secret: String,
    #[serde(alias = "SkyApiSubscriptionKey")]
    pub sky_api_subscription_key: String,
    #[serde(alias = "SkyApiBaseUri")]
    pub sky_api_base_uri: String,
}

impl Default for SkyApiConfig {
    fn default() -> Self {
        Self {
            auth_base_uri: DEFAULT_AUTH_BASE_URI.to_string(),
            auth_client_id: String::new(),
            auth_client_secret: String::new(),
            sky_api_subscription_key: String::new(),
            sky_api_base_uri: DEFAULT_SKY_API_BASE_URI.to_string(),
        }
    }
}

impl std::fmt::Debug for SkyApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkyApiConfig")
            .field("auth_base_uri", &self.auth_base_uri)
            .field("auth_client_id", &self.auth_client_id)
            .field("auth_client_secret", &"[REDACTED]")
            .field("sky_api_subscription_key", &"[REDACTED]")
            .field("sky_api_base_uri", &self.sky_api_base_uri)
            .finish()
    }
}

/// Scheduling and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub interval_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_SYNC_INTERVAL_SECS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Location of the persisted state and its encryption key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub state_path: PathBuf,
    /// Defaults to a sibling of `state_path`.
    pub key_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { state_path: PathBuf::from(DEFAULT_STATE_FILE), key_path: None }
    }
}

impl StorageConfig {
    /// Key file location, explicit or next to the state file.
    #[must_use]
    pub fn resolved_key_path(&self) -> PathBuf {
        match &self.key_path {
            Some(path) => path.clone(),
            None => self.state_path.with_file_name(DEFAULT_KEY_FILE),
        }
    }
}

impl Config {
    /// Reject configurations the sync loop cannot run with.
    ///
    /// # Errors
    /// Returns `SkySyncError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("auth_base_uri", &self.sky.auth_base_uri),
            ("auth_client_id", &self.sky.auth_client_id),
            ("auth_client_secret", &self.sky.auth_client_secret),
            ("sky_api_subscription_key", &self.sky.sky_api_subscription_key),
            ("sky_api_base_uri", &self.sky.sky_api_base_uri),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(SkySyncError::Config(format!("Missing required setting: {field}")));
        }

        if self.sync.interval_seconds == 0 {
            return Err(SkySyncError::Config("sync.interval_seconds must be positive".into()));
        }
        if self.sync.request_timeout_seconds == 0 {
            return Err(SkySyncError::Config(
                "sync.request_timeout_seconds must be positive".into(),
            ));
        }
        if self.storage.state_path.as_os_str().is_empty() {
            return Err(SkySyncError::Config("storage.state_path must not be empty".into()));
        }

        Ok(())
    }
}
