//! External service integrations

pub mod sky;
