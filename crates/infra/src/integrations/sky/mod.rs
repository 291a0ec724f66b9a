//! SKY API adapters
//!
//! - [`auth`]: refresh-token exchange against the OAuth token endpoint
//! - [`constituents`]: paged constituent list with one refresh-and-retry on 401

pub mod auth;
pub mod constituents;

pub use auth::SkyAuthClient;
pub use constituents::ConstituentsClient;
use skysync_domain::{Result, SkySyncError};
use url::Url;

/// Resolve `relative` against `base` the way a browser would: a base without
/// a trailing slash loses its last path segment.
pub(crate) fn resolve(base: &str, relative: &str) -> Result<Url> {
    Url::parse(base)
        .and_then(|base| base.join(relative))
        .map_err(|e| SkySyncError::Config(format!("Invalid base URI '{base}': {e}")))
}
