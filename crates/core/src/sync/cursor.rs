//! Cursor <-> query string conversions

use chrono::{DateTime, SecondsFormat, Utc};
use skysync_domain::constants::{QUERY_LAST_MODIFIED, QUERY_SORT_TOKEN};
use skysync_domain::{PaginationCursor, Result, SkySyncError};
use url::Url;

/// Extract the next cursor from a server-supplied continuation link.
///
/// Query values are percent-decoded. Parameters the link does not carry come
/// back as `None`.
///
/// # Errors
/// Returns `SkySyncError::InvalidInput` if `link` is not an absolute URL.
pub fn build_cursor_from_continuation_link(link: &str) -> Result<PaginationCursor> {
    let url = Url::parse(link)
        .map_err(|e| SkySyncError::InvalidInput(format!("Invalid continuation link: {e}")))?;

    let mut cursor = PaginationCursor::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            QUERY_LAST_MODIFIED if cursor.last_modified.is_none() => {
                cursor.last_modified = Some(value.into_owned());
            }
            QUERY_SORT_TOKEN if cursor.sort_token.is_none() => {
                cursor.sort_token = Some(value.into_owned());
            }
            _ => {}
        }
    }

    Ok(cursor)
}

/// Render the non-empty cursor fields as `key=value` pairs joined by `&`.
///
/// Values are inserted as stored.
#[must_use]
pub fn build_query_string(cursor: &PaginationCursor) -> String {
    [(QUERY_LAST_MODIFIED, &cursor.last_modified), (QUERY_SORT_TOKEN, &cursor.sort_token)]
        .into_iter()
        .filter_map(|(key, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Some(format!("{key}={v}")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Timestamp format used for synthesized `last_modified` values.
#[must_use]
pub fn format_last_modified(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
