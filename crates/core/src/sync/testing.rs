//! In-memory port implementations for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use skysync_domain::{
    ApiResponse, Credentials, PaginationCursor, Result, SkySyncError, SyncState,
};

use super::ports::{Clock, ConstituentSource, TokenStore};

/// Token store keeping cleartext tokens in memory.
#[derive(Default)]
pub struct MemoryTokenStore {
    state: Mutex<SyncState>,
    fail_writes: Mutex<bool>,
    writes: Mutex<usize>,
}

impl MemoryTokenStore {
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }

    fn write(&self, update: impl FnOnce(&mut SyncState)) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(SkySyncError::Storage("write rejected".into()));
        }
        update(&mut self.state.lock());
        *self.writes.lock() += 1;
        Ok(())
    }
}

fn normalize(token: Option<&str>) -> Option<String> {
    token.filter(|t| !t.is_empty()).map(str::to_string)
}

impl TokenStore for MemoryTokenStore {
    fn state(&self) -> SyncState {
        self.state.lock().clone()
    }

    fn access_token(&self) -> Option<String> {
        self.state.lock().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.state.lock().refresh_token.clone()
    }

    fn set_access_token(&self, token: Option<&str>) -> Result<()> {
        self.write(|s| s.access_token = normalize(token))
    }

    fn set_refresh_token(&self, token: Option<&str>) -> Result<()> {
        self.write(|s| s.refresh_token = normalize(token))
    }

    fn set_credentials(&self, credentials: &Credentials) -> Result<()> {
        self.write(|s| {
            s.access_token = normalize(credentials.access_token.as_deref());
            s.refresh_token = normalize(credentials.refresh_token.as_deref());
        })
    }

    fn last_sync_date(&self) -> DateTime<Utc> {
        self.state.lock().last_sync_date
    }

    fn set_last_sync_date(&self, timestamp: DateTime<Utc>) -> Result<()> {
        self.write(|s| s.last_sync_date = timestamp)
    }

    fn cursor(&self) -> Option<PaginationCursor> {
        self.state.lock().constituent_query_params.clone()
    }

    fn set_cursor(&self, cursor: &PaginationCursor) -> Result<()> {
        self.write(|s| s.constituent_query_params = Some(cursor.clone()))
    }
}

/// Source replaying canned replies and recording the cursors it was asked for.
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Result<ApiResponse>>>,
    requested: Mutex<Vec<PaginationCursor>>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Result<ApiResponse>>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies.into()), requested: Mutex::new(Vec::new()) })
    }

    pub fn requested(&self) -> Vec<PaginationCursor> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl ConstituentSource for ScriptedSource {
    async fn fetch_page(&self, cursor: &PaginationCursor) -> Result<ApiResponse> {
        self.requested.lock().push(cursor.clone());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SkySyncError::Internal("no scripted reply left".into())))
    }
}

/// Clock frozen at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock that moves forward by `step` on every reading.
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: chrono::Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
        Self { next: Mutex::new(start), step }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock();
        let now = *next;
        *next = now + self.step;
        now
    }
}
