//! Application constants
//!
//! Protocol strings, file names and defaults shared by the sync crates.

// Scheduling
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const SCHEDULER_JOIN_TIMEOUT_SECS: u64 = 5;

// Persistence
pub const DEFAULT_STATE_FILE: &str = "skysync_storage.json";
pub const DEFAULT_KEY_FILE: &str = "skysync_storage.key";

// Remote protocol
pub const SUBSCRIPTION_KEY_HEADER: &str = "bb-api-subscription-key";
pub const TOKEN_PATH: &str = "token";
pub const CONSTITUENTS_BASE_PATH: &str = "constituent/v1/";
pub const CONSTITUENTS_RESOURCE: &str = "constituents";
pub const QUERY_LAST_MODIFIED: &str = "last_modified";
pub const QUERY_SORT_TOKEN: &str = "sort_token";

// Replacement payloads for client errors the service answers without detail
pub const BAD_REQUEST_ERROR_MESSAGE: &str =
    "The specified constituents request was not in the correct format.";
pub const NOT_FOUND_ERROR_MESSAGE: &str = "No constituent records were found.";

// Operator hints logged when a cycle fails on a client error
pub const UNAUTHORIZED_HINT: &str = "Please ensure your application ID/secret is present in the configuration, or you may need to provide a valid refresh token.";
pub const SUBSCRIPTION_KEY_HINT: &str =
    "Please ensure your SKY API subscription key is present in the configuration.";

// Configuration
pub const ENV_PREFIX: &str = "SKYSYNC_";
pub const LOG_FORMAT_ENV: &str = "SKYSYNC_LOG_FORMAT";
pub const CONFIG_PROBE_PATHS: &[&str] = &["appsettings.json", "skysync.toml", "skysync.json"];

// Task names
pub const CONSTITUENTS_TASK: &str = "constituents";
