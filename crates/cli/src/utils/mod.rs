//! Process-level helpers

pub mod logging;
pub mod shutdown;
