//! # SkySync Infrastructure
//!
//! Infrastructure implementations of core sync ports.
//!
//! This crate contains:
//! - Configuration loading (file, `.env`, environment)
//! - The encrypted JSON token store
//! - HTTP transport and the SKY API adapters
//! - The recurring sync scheduler
//!
//! ## Architecture
//! - Implements traits defined in `skysync-core`
//! - Depends on `skysync-common` and `skysync-core`
//! - Contains all "impure" code (files, network, timers)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod scheduling;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, HttpReply};
pub use integrations::sky::{ConstituentsClient, SkyAuthClient};
pub use scheduling::{SchedulerError, SchedulerExit, SyncScheduler, SyncSchedulerConfig};
pub use storage::{FileTokenStore, KeyFileProtector, PlaintextProtector};
