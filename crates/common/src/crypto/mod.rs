//! Symmetric encryption for secrets persisted to disk.

pub mod encryption;

pub use encryption::{EncryptedData, EncryptionService};
