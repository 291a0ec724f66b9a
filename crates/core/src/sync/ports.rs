//! Port interfaces for constituent sync

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skysync_domain::{
    ApiResponse, AuthResponse, Credentials, PaginationCursor, Record, Result, SyncOutcome,
    SyncState, TokenPayload,
};
use tracing::{debug, error, warn};

/// Persistent home for credentials, the last sync timestamp and the
/// pagination cursor.
///
/// Every setter rewrites the whole persisted record. Getters hand out
/// copies; callers never hold a reference to the live state.
pub trait TokenStore: Send + Sync {
    /// Snapshot of the persisted record (tokens still protected).
    fn state(&self) -> SyncState;

    /// Decrypted access token, or `None` when absent or unreadable.
    fn access_token(&self) -> Option<String>;

    /// Decrypted refresh token, or `None` when absent or unreadable.
    fn refresh_token(&self) -> Option<String>;

    /// `None` or `""` clears the stored value.
    fn set_access_token(&self, token: Option<&str>) -> Result<()>;

    /// `None` or `""` clears the stored value.
    fn set_refresh_token(&self, token: Option<&str>) -> Result<()>;

    /// Replace both tokens in a single write.
    fn set_credentials(&self, credentials: &Credentials) -> Result<()>;

    /// Start time of the most recent cycle.
    fn last_sync_date(&self) -> DateTime<Utc>;

    /// Record the start time of a cycle.
    fn set_last_sync_date(&self, timestamp: DateTime<Utc>) -> Result<()>;

    /// Where the next fetch resumes, if anywhere.
    fn cursor(&self) -> Option<PaginationCursor>;

    /// Persist the resume point for the next fetch.
    fn set_cursor(&self, cursor: &PaginationCursor) -> Result<()>;

    /// Both tokens in cleartext.
    fn credentials(&self) -> Credentials {
        Credentials { access_token: self.access_token(), refresh_token: self.refresh_token() }
    }

    /// Forget both tokens. Failures are logged, never returned.
    fn clear_tokens(&self) {
        if let Err(err) = self.set_credentials(&Credentials::default()) {
            error!(error = %err, "Failed to clear stored tokens");
        }
    }

    /// Store the token pair carried by a successful token endpoint reply.
    ///
    /// Failed replies leave the stored tokens untouched, as does a success
    /// body that does not decode. A reply without a refresh token only
    /// replaces the access token.
    fn set_tokens_from_auth_response(&self, response: &AuthResponse) {
        if !response.is_success() {
            return;
        }

        let payload: TokenPayload = match serde_json::from_str(&response.body) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "Token response body did not decode; keeping stored tokens");
                return;
            }
        };

        let written = match payload.refresh_token.filter(|t| !t.is_empty()) {
            Some(refresh_token) => self.set_credentials(&Credentials {
                access_token: Some(payload.access_token),
                refresh_token: Some(refresh_token),
            }),
            None => {
                debug!("Token response carried no refresh token; keeping the stored one");
                self.set_access_token(Some(&payload.access_token))
            }
        };
        if let Err(err) = written {
            error!(error = %err, "Failed to persist refreshed tokens");
        }
    }
}

/// Reversible protection applied to tokens before they touch disk.
pub trait TokenProtector: Send + Sync {
    /// Seal `plaintext` for storage.
    fn protect(&self, plaintext: &str) -> Result<String>;

    /// Reverse [`TokenProtector::protect`].
    fn unprotect(&self, protected: &str) -> Result<String>;
}

/// Exchanges the stored refresh token for a fresh token pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Returns the raw endpoint reply whatever its status; transport errors
    /// are returned as `SkySyncError::Network`.
    async fn refresh_access_token(&self) -> Result<AuthResponse>;
}

/// Fetches one page of modified constituents.
#[async_trait]
pub trait ConstituentSource: Send + Sync {
    /// Request the page `cursor` points at. Non-2xx replies come back as
    /// `Ok` with the status set.
    async fn fetch_page(&self, cursor: &PaginationCursor) -> Result<ApiResponse>;
}

/// Destination for fetched records.
pub trait RecordSink: Send + Sync {
    /// Consume one page of records.
    fn apply(&self, records: &[Record]);
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One named unit of synchronization run once per cycle.
#[async_trait]
pub trait SyncTask: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Run once for the current cycle.
    async fn run(&self) -> SyncOutcome;
}
