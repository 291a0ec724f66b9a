//! JSON-file token store
//!
//! The whole [`SyncState`] lives in one pretty-printed JSON file that is
//! truncated and rewritten on every change. A missing or unreadable file
//! yields a fresh state instead of an error, so a corrupt file costs at most
//! one re-authorization.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use skysync_core::{TokenProtector, TokenStore};
use skysync_domain::{Credentials, PaginationCursor, Result, SyncState};
use tracing::{debug, warn};

use crate::errors::to_domain;

/// File-backed [`TokenStore`].
///
/// Writes are serialized by an internal mutex that is held across the file
/// write, so the in-memory state never runs ahead of the disk.
pub struct FileTokenStore {
    path: PathBuf,
    protector: Arc<dyn TokenProtector>,
    state: Mutex<SyncState>,
}

impl std::fmt::Debug for FileTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTokenStore").field("path", &self.path).finish_non_exhaustive()
    }
}

impl FileTokenStore {
    /// Open the store at `path`, loading whatever state is there.
    pub fn open(path: impl AsRef<Path>, protector: Arc<dyn TokenProtector>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = load(&path);
        Self { path, protector, state: Mutex::new(state) }
    }

    /// Location of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, replacing the in-memory state.
    pub fn reload(&self) -> SyncState {
        let state = load(&self.path);
        *self.state.lock() = state.clone();
        state
    }

    fn update(&self, change: impl FnOnce(&mut SyncState)) -> Result<()> {
        let mut state = self.state.lock();
        let mut next = state.clone();
        change(&mut next);
        persist(&self.path, &next)?;
        *state = next;
        Ok(())
    }

    fn seal(&self, token: Option<&str>) -> Result<Option<String>> {
        match token {
            None | Some("") => Ok(None),
            Some(token) => self.protector.protect(token).map(Some),
        }
    }

    fn reveal(&self, stored: Option<String>, which: &'static str) -> Option<String> {
        let sealed = stored?;
        match self.protector.unprotect(&sealed) {
            Ok(token) => Some(token),
            Err(err) => {
                warn!(token = which, error = %err, "Stored token unreadable; treating as absent");
                None
            }
        }
    }
}

fn load(path: &Path) -> SyncState {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "No state file yet; starting fresh");
            return SyncState::default();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "State file unreadable; starting fresh");
            return SyncState::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(state) => {
            debug!(path = %path.display(), "Loaded sync state");
            state
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "State file is not valid; starting fresh");
            SyncState::default()
        }
    }
}

fn persist(path: &Path, state: &SyncState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_domain)?;
    }
    let json = serde_json::to_string_pretty(state).map_err(to_domain)?;
    fs::write(path, json).map_err(to_domain)
}

impl TokenStore for FileTokenStore {
    fn state(&self) -> SyncState {
        self.state.lock().clone()
    }

    fn access_token(&self) -> Option<String> {
        let stored = self.state.lock().access_token.clone();
        self.reveal(stored, "access")
    }

    fn refresh_token(&self) -> Option<String> {
        let stored = self.state.lock().refresh_token.clone();
        self.reveal(stored, "refresh")
    }

    fn set_access_token(&self, token: Option<&str>) -> Result<()> {
        let sealed = self.seal(token)?;
        self.update(|s| s.access_token = sealed)
    }

    fn set_refresh_token(&self, token: Option<&str>) -> Result<()> {
        let sealed = self.seal(token)?;
        self.update(|s| s.refresh_token = sealed)
    }

    fn set_credentials(&self, credentials: &Credentials) -> Result<()> {
        let access = self.seal(credentials.access_token.as_deref())?;
        let refresh = self.seal(credentials.refresh_token.as_deref())?;
        self.update(|s| {
            s.access_token = access;
            s.refresh_token = refresh;
        })
    }

    fn last_sync_date(&self) -> DateTime<Utc> {
        self.state.lock().last_sync_date
    }

    fn set_last_sync_date(&self, timestamp: DateTime<Utc>) -> Result<()> {
        self.update(|s| s.last_sync_date = timestamp)
    }

    fn cursor(&self) -> Option<PaginationCursor> {
        self.state.lock().constituent_query_params.clone()
    }

    fn set_cursor(&self, cursor: &PaginationCursor) -> Result<()> {
        self.update(|s| s.constituent_query_params = Some(cursor.clone()))
    }
}
