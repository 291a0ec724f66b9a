//! Configuration loading
//!
//! Layers a config file, environment variables and `.env` into one
//! validated [`skysync_domain::Config`].

pub mod loader;

pub use loader::{
    apply_env_overrides, load, load_env_file, load_from_env, load_from_file, probe_config_paths,
    EnvFile,
};
