//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Incremental constituent sync for SKY API.
#[derive(Debug, Parser)]
#[command(name = "skysync", author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Args {
    /// Refresh token to seed the store with; replaces any stored tokens
    #[arg(short = 'r', long = "refreshtoken", value_name = "TOKEN")]
    pub refresh_token: Option<String>,

    /// Config file (JSON or TOML); defaults to probing ./appsettings.json,
    /// ./skysync.toml and ./skysync.json
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print help
    #[allow(dead_code)]
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
    help: Option<bool>,
}
