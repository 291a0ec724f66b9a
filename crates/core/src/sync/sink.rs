//! Record sinks

use std::sync::atomic::{AtomicU64, Ordering};

use skysync_domain::Record;
use tracing::debug;

use super::ports::RecordSink;

/// Sink that only counts and logs what it receives.
#[derive(Debug, Default)]
pub struct LoggingRecordSink {
    applied: AtomicU64,
}

impl LoggingRecordSink {
    /// Sink with a zero count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records received since construction.
    #[must_use]
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }
}

impl RecordSink for LoggingRecordSink {
    fn apply(&self, records: &[Record]) {
        let total = self.applied.fetch_add(records.len() as u64, Ordering::Relaxed)
            + records.len() as u64;
        debug!(batch = records.len(), total, "Applied constituent records");
    }
}
