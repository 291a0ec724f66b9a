//! Constituent sync engine
//!
//! - [`ports`]: traits the engine is written against
//! - [`constituents`]: the incremental fetch task
//! - [`cycle`]: concurrent execution of all tasks in a cycle
//! - [`cursor`]: continuation link and query string helpers
//! - [`sink`]: record sinks

pub mod constituents;
pub mod cursor;
pub mod cycle;
pub mod ports;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;
