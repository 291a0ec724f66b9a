//! Sync state types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access/refresh token pair in cleartext.
///
/// Cleared tokens are `None`, never an empty string.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Credentials")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

/// Position marker for incremental fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub sort_token: Option<String>,
}

impl PaginationCursor {
    /// Cursor that resumes from a modification timestamp with no sort token.
    #[must_use]
    pub fn from_last_modified(last_modified: impl Into<String>) -> Self {
        Self { last_modified: Some(last_modified.into()), sort_token: None }
    }

    /// Empty iff both fields are absent or empty strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        fn blank(field: &Option<String>) -> bool {
            field.as_deref().map_or(true, str::is_empty)
        }
        blank(&self.last_modified) && blank(&self.sort_token)
    }
}

/// The complete persisted record. Token fields hold protected (encrypted)
/// values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncState {
    pub last_sync_date: DateTime<Utc>,
    pub constituent_query_params: Option<PaginationCursor>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Result of one sync task invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Success,
    /// Not produced while transport failures are treated as success.
    RetryableFailure,
    FatalFailure,
}

impl SyncOutcome {
    /// Only [`SyncOutcome::Success`] lets the scheduler continue.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::RetryableFailure => write!(f, "retryable_failure"),
            Self::FatalFailure => write!(f, "fatal_failure"),
        }
    }
}

/// Outcomes of every task in one cycle, in task order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub outcomes: Vec<(String, SyncOutcome)>,
}

impl CycleReport {
    /// True when every task succeeded (vacuously true for no tasks).
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_success())
    }

    /// Names of tasks that did not succeed.
    #[must_use]
    pub fn failed_tasks(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
