//! # SkySync Core
//!
//! Pure sync logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (token storage, token refresh, constituent fetch,
//!   record sink, clock)
//! - The incremental constituent sync task
//! - Cycle execution across sync tasks
//!
//! ## Architecture Principles
//! - Only depends on `skysync-domain`
//! - No file, HTTP, or timer code
//! - All external effects via traits

pub mod sync;

// Re-export specific items to avoid ambiguity
pub use sync::constituents::ConstituentSyncTask;
pub use sync::cursor::{build_cursor_from_continuation_link, build_query_string};
pub use sync::cycle::run_cycle;
pub use sync::ports::{
    Clock, ConstituentSource, RecordSink, SyncTask, SystemClock, TokenProtector, TokenRefresher,
    TokenStore,
};
pub use sync::sink::LoggingRecordSink;
