//! Configuration loader
//!
//! ## Loading Strategy
//! 1. [`load_env_file`] copies `.env` into the process environment. The
//!    binary calls it once, before logging starts.
//! 2. Read the config file: the explicit path, else the first probed path,
//!    else built-in defaults
//! 3. Overlay `SKYSYNC_*` environment variables
//! 4. Validate
//!
//! ## Environment Variables
//! - `SKYSYNC_AUTH_BASE_URI`: OAuth service base URI
//! - `SKYSYNC_AUTH_CLIENT_ID`: application id
//! - `SKYSYNC_AUTH_CLIENT_SECRET`: application secret
//! - `SKYSYNC_SKY_API_SUBSCRIPTION_KEY`: subscription key
//! - `SKYSYNC_SKY_API_BASE_URI`: SKY API base URI
//! - `SKYSYNC_SYNC_INTERVAL_SECONDS`: seconds between cycles
//! - `SKYSYNC_REQUEST_TIMEOUT_SECONDS`: per-request timeout
//! - `SKYSYNC_STATE_PATH`: persisted state file
//! - `SKYSYNC_KEY_PATH`: token encryption key file
//!
//! ## File Locations
//! `appsettings.json`, `skysync.toml` and `skysync.json`, looked up in the
//! working directory and then next to the executable.

use std::path::{Path, PathBuf};

use skysync_domain::constants::{CONFIG_PROBE_PATHS, ENV_PREFIX};
use skysync_domain::{Config, Result, SkySyncError};

/// Load, overlay and validate the configuration.
///
/// # Errors
/// Returns `SkySyncError::Config` if:
/// - `path` is given but does not exist
/// - the file cannot be read or parsed
/// - an environment override has an invalid value
/// - the merged configuration fails [`Config::validate`]
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => load_from_file(Some(path))?,
        None => match probe_config_paths() {
            Some(found) => load_from_file(Some(found))?,
            None => {
                tracing::info!("No config file found; using defaults and environment");
                Config::default()
            }
        },
    };

    let config = apply_env_overrides(config)?;
    config.validate()?;
    Ok(config)
}

/// What happened when `.env` was read.
#[derive(Debug)]
pub enum EnvFile {
    /// Variables were copied from this file.
    Loaded(PathBuf),
    /// No `.env` in the working directory or its parents.
    Missing,
    /// The file exists but could not be read or parsed.
    Unreadable(String),
}

impl EnvFile {
    fn from_result(result: dotenvy::Result<PathBuf>) -> Self {
        match result {
            Ok(path) => Self::Loaded(path),
            Err(e) if e.not_found() => Self::Missing,
            Err(e) => Self::Unreadable(e.to_string()),
        }
    }

    /// Report the outcome once a subscriber is installed.
    pub fn log(&self) {
        match self {
            Self::Loaded(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Self::Missing => tracing::debug!("No .env file found"),
            Self::Unreadable(error) => tracing::warn!(%error, "Ignoring unreadable .env file"),
        }
    }
}

/// Copy `.env` from the working directory into the process environment.
///
/// Existing variables win over the file. Logging may not be up yet, so
/// the outcome is returned for [`EnvFile::log`].
#[must_use]
pub fn load_env_file() -> EnvFile {
    EnvFile::from_result(dotenvy::dotenv())
}

/// Built-in defaults overlaid with `SKYSYNC_*` variables. Not validated.
///
/// # Errors
/// Returns `SkySyncError::Config` when a numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    apply_env_overrides(Config::default())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Format is chosen by extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `SkySyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SkySyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SkySyncError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SkySyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Overlay every `SKYSYNC_*` variable that is set onto `config`.
///
/// # Errors
/// Returns `SkySyncError::Config` when a numeric variable does not parse.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    let mut overridden = Vec::new();

    for (name, field) in [
        ("AUTH_BASE_URI", &mut config.sky.auth_base_uri),
        ("AUTH_CLIENT_ID", &mut config.sky.auth_client_id),
        ("AUTH_CLIENT_SECRET", &mut config.sky.auth_client_secret),
        ("SKY_API_SUBSCRIPTION_KEY", &mut config.sky.sky_api_subscription_key),
        ("SKY_API_BASE_URI", &mut config.sky.sky_api_base_uri),
    ] {
        if let Some(value) = env_var(name) {
            *field = value;
            overridden.push(name);
        }
    }

    for (name, field) in [
        ("SYNC_INTERVAL_SECONDS", &mut config.sync.interval_seconds),
        ("REQUEST_TIMEOUT_SECONDS", &mut config.sync.request_timeout_seconds),
    ] {
        if let Some(value) = env_var(name) {
            *field = value.trim().parse::<u64>().map_err(|e| {
                SkySyncError::Config(format!("Invalid {ENV_PREFIX}{name} '{value}': {e}"))
            })?;
            overridden.push(name);
        }
    }

    if let Some(value) = env_var("STATE_PATH") {
        config.storage.state_path = PathBuf::from(value);
        overridden.push("STATE_PATH");
    }
    if let Some(value) = env_var("KEY_PATH") {
        config.storage.key_path = Some(PathBuf::from(value));
        overridden.push("KEY_PATH");
    }

    if !overridden.is_empty() {
        tracing::debug!(?overridden, "Applied environment overrides");
    }
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SkySyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SkySyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SkySyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file
///
/// Candidates are tried in the working directory first, then next to the
/// executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_PROBE_PATHS.iter().map(move |name| root.join(name)))
        .find(|path| path.is_file())
}

/// Non-empty value of `SKYSYNC_{name}`.
fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}")).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::{Builder, NamedTempFile};

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: &[&str] = &[
        "SKYSYNC_AUTH_BASE_URI",
        "SKYSYNC_AUTH_CLIENT_ID",
        "SKYSYNC_AUTH_CLIENT_SECRET",
        "SKYSYNC_SKY_API_SUBSCRIPTION_KEY",
        "SKYSYNC_SKY_API_BASE_URI",
        "SKYSYNC_SYNC_INTERVAL_SECONDS",
        "SKYSYNC_REQUEST_TIMEOUT_SECONDS",
        "SKYSYNC_STATE_PATH",
        "SKYSYNC_KEY_PATH",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn env_file_outcomes() {
        let missing = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(EnvFile::from_result(Err(missing)), EnvFile::Missing));

        let denied = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(matches!(EnvFile::from_result(Err(denied)), EnvFile::Unreadable(_)));

        let loaded = EnvFile::from_result(Ok(PathBuf::from("/srv/.env")));
        assert!(matches!(loaded, EnvFile::Loaded(ref p) if p == Path::new("/srv/.env")));
        loaded.log();
    }

    fn temp_config(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    const APPSETTINGS: &str = r#"{
        "AppSettings": {
            "AuthBaseUri": "https://oauth2.example.test",
            "AuthClientId": "file-id",
            "AuthClientSecret": "file-secret",
            "SkyApiSubscriptionKey": "file-key",
            "SkyApiBaseUri": "https://api.example.test"
        }
    }"#;

    #[test]
    fn test_load_from_file_appsettings_layout() {
        let file = temp_config(".json", APPSETTINGS);

        let config = load_from_file(Some(file.path().to_path_buf())).expect("config");

        assert_eq!(config.sky.auth_client_id, "file-id");
        assert_eq!(config.sky.sky_api_subscription_key, "file-key");
        assert_eq!(config.sky.sky_api_base_uri, "https://api.example.test");
        assert_eq!(config.sync.interval_seconds, 60);
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = temp_config(
            ".toml",
            r#"
            [sky]
            auth_client_id = "toml-id"
            auth_client_secret = "toml-secret"
            sky_api_subscription_key = "toml-key"

            [sync]
            interval_seconds = 15

            [storage]
            state_path = "/var/lib/skysync/state.json"
            "#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).expect("config");

        assert_eq!(config.sky.auth_client_id, "toml-id");
        assert_eq!(config.sky.auth_base_uri, "https://oauth2.sky.blackbaud.com");
        assert_eq!(config.sync.interval_seconds, 15);
        assert_eq!(config.sync.request_timeout_seconds, 30);
        assert_eq!(config.storage.state_path, PathBuf::from("/var/lib/skysync/state.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_missing_path() {
        let result = load_from_file(Some(PathBuf::from("/definitely/not/here.json")));
        assert!(matches!(result, Err(SkySyncError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let file = temp_config(".json", "{ nope");
        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"), "got {err}");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_config(".yaml", "sky: {}");
        let result = load_from_file(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(SkySyncError::Config(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("SKYSYNC_AUTH_CLIENT_ID", "env-id");
        std::env::set_var("SKYSYNC_SYNC_INTERVAL_SECONDS", "5");
        std::env::set_var("SKYSYNC_KEY_PATH", "/tmp/skysync.key");

        let file = temp_config(".json", APPSETTINGS);
        let config = load(Some(file.path().to_path_buf()));
        clear_env();

        let config = config.expect("config");
        assert_eq!(config.sky.auth_client_id, "env-id");
        assert_eq!(config.sky.auth_client_secret, "file-secret");
        assert_eq!(config.sync.interval_seconds, 5);
        assert_eq!(config.storage.resolved_key_path(), PathBuf::from("/tmp/skysync.key"));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("SKYSYNC_AUTH_CLIENT_ID", "");

        let config = load_from_env();
        clear_env();

        assert_eq!(config.expect("config").sky.auth_client_id, "");
    }

    #[test]
    fn test_invalid_number_in_env() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("SKYSYNC_REQUEST_TIMEOUT_SECONDS", "soon");

        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, SkySyncError::Config(_)));
        assert!(err.to_string().contains("SKYSYNC_REQUEST_TIMEOUT_SECONDS"), "got {err}");
    }

    #[test]
    fn test_load_rejects_incomplete_config() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let file = temp_config(".json", r#"{"AppSettings": {"AuthClientId": "only-id"}}"#);
        let err = load(Some(file.path().to_path_buf())).unwrap_err();

        assert!(matches!(err, SkySyncError::Config(_)));
        assert!(err.to_string().contains("auth_client_secret"), "got {err}");
    }
}
