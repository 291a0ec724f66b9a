//! Incremental constituent sync

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skysync_domain::constants::{CONSTITUENTS_TASK, SUBSCRIPTION_KEY_HINT, UNAUTHORIZED_HINT};
use skysync_domain::{ConstituentPage, PaginationCursor, SyncOutcome};
use tracing::{debug, error, info, instrument, warn};

use super::cursor::{build_cursor_from_continuation_link, format_last_modified};
use super::ports::{Clock, ConstituentSource, RecordSink, SyncTask, SystemClock, TokenStore};

/// Pulls constituents modified since the stored cursor and advances it.
pub struct ConstituentSyncTask {
    store: Arc<dyn TokenStore>,
    source: Arc<dyn ConstituentSource>,
    sink: Arc<dyn RecordSink>,
    clock: Arc<dyn Clock>,
}

impl ConstituentSyncTask {
    /// Task reading the wall clock.
    pub fn new(
        store: Arc<dyn TokenStore>,
        source: Arc<dyn ConstituentSource>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self { store, source, sink, clock: Arc::new(SystemClock) }
    }

    /// Replace the wall clock, mainly for tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one incremental fetch.
    ///
    /// The sync date is persisted before the fetch, so it moves even when
    /// the cycle fails. A transport failure counts as success so the next
    /// tick retries it. A cursor synthesized from the clock is persisted
    /// when the page has no continuation link, so later cycles resume from
    /// it instead of from their own start time.
    #[instrument(skip(self), fields(task = CONSTITUENTS_TASK))]
    pub async fn sync(&self) -> SyncOutcome {
        let started = self.clock.now();
        if let Err(err) = self.store.set_last_sync_date(started) {
            error!(error = %err, "Failed to persist last sync date");
            return SyncOutcome::FatalFailure;
        }

        let (cursor, synthesized) = self.resume_cursor(started);
        debug!(
            last_modified = cursor.last_modified.as_deref().unwrap_or_default(),
            has_sort_token = cursor.sort_token.is_some(),
            "Fetching constituent page"
        );

        let response = match self.source.fetch_page(&cursor).await {
            Ok(response) => response,
            Err(err) if err.is_transport() => {
                warn!(error = %err, "Constituent request did not complete");
                info!("Retrying...");
                return SyncOutcome::Success;
            }
            Err(err) => {
                error!(error = %err, "Constituent request failed");
                info!("Exiting.");
                return SyncOutcome::FatalFailure;
            }
        };

        if !response.is_success() {
            report_status(response.status);
            return SyncOutcome::FatalFailure;
        }

        let page: ConstituentPage = match serde_json::from_str(&response.body) {
            Ok(page) => page,
            Err(err) => {
                error!(error = %err, "Constituent page did not decode");
                return SyncOutcome::FatalFailure;
            }
        };

        match page.next_link.as_deref() {
            Some(link) => {
                let next = match build_cursor_from_continuation_link(link) {
                    Ok(next) => next,
                    Err(err) => {
                        error!(error = %err, "Unusable continuation link");
                        return SyncOutcome::FatalFailure;
                    }
                };
                if let Err(err) = self.store.set_cursor(&next) {
                    error!(error = %err, "Failed to persist pagination cursor");
                    return SyncOutcome::FatalFailure;
                }
            }
            None if synthesized => {
                if let Err(err) = self.store.set_cursor(&cursor) {
                    error!(error = %err, "Failed to persist starting cursor");
                    return SyncOutcome::FatalFailure;
                }
                debug!("Page carried no continuation link; keeping starting cursor");
            }
            None => debug!("Page carried no continuation link; stored cursor unchanged"),
        }

        self.apply(started, &page);
        SyncOutcome::Success
    }

    /// Stored cursor, or one built from `now`. The flag is set when the
    /// cursor was built here and is not yet in the store.
    fn resume_cursor(&self, now: DateTime<Utc>) -> (PaginationCursor, bool) {
        match self.store.cursor() {
            Some(cursor) if !cursor.is_empty() => (cursor, false),
            _ => {
                info!("No stored cursor; starting from the current time");
                (PaginationCursor::from_last_modified(format_last_modified(now)), true)
            }
        }
    }

    fn apply(&self, started: DateTime<Utc>, page: &ConstituentPage) {
        info!(
            sync_date = %started,
            count = page.count,
            "{} constituents modified since last sync",
            page.count
        );
        if page.count > 0 {
            info!("Updating {} records", page.count);
        }
        self.sink.apply(&page.value);
    }
}

fn report_status(status: u16) {
    error!(status, "Constituent request was rejected");
    match status {
        401 => info!("{UNAUTHORIZED_HINT}"),
        400 | 404 => info!("{SUBSCRIPTION_KEY_HINT}"),
        _ => {}
    }
}

#[async_trait]
impl SyncTask for ConstituentSyncTask {
    fn name(&self) -> &str {
        CONSTITUENTS_TASK
    }

    async fn run(&self) -> SyncOutcome {
        self.sync().await
    }
}
