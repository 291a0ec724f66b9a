//! Tracing setup and secret redaction

use skysync_domain::constants::LOG_FORMAT_ENV;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` selects levels (default `info`). Setting `SKYSYNC_LOG_FORMAT`
/// to `json` switches to JSON lines.
///
/// # Errors
/// Fails when a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if json_requested(std::env::var(LOG_FORMAT_ENV).ok().as_deref()) {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

/// Loggable stand-in for a secret: only its length.
#[must_use]
pub fn redact_token(token: &str) -> String {
    format!("[REDACTED; {} chars]", token.chars().count())
}
