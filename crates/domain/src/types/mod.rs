//! Domain types and models
//!
//! - [`sync`]: state persisted between runs and per-cycle results
//! - [`remote`]: response shapes exchanged with the token and constituent
//!   endpoints

pub mod remote;
pub mod sync;

pub use remote::{ApiResponse, AuthResponse, ConstituentPage, Record, TokenPayload};
pub use sync::{Credentials, CycleReport, PaginationCursor, SyncOutcome, SyncState};
