//! SkySync - headless constituent sync
//!
//! Library half of the `skysync` binary: argument parsing, dependency wiring
//! and logging setup.

pub mod args;
pub mod context;
pub mod utils;

pub use args::Args;
pub use context::AppContext;
