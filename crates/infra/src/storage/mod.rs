//! Local persistence: the JSON state file and token protection at rest.

pub mod protector;
pub mod token_store;

pub use protector::{KeyFileProtector, PlaintextProtector};
pub use token_store::FileTokenStore;
