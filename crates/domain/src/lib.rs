//! # SkySync Domain
//!
//! Business domain types for incremental constituent sync.
//!
//! This crate contains:
//! - Sync state types (credentials, pagination cursor, persisted state)
//! - Remote payload shapes (token response, constituent page)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other SkySync crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
