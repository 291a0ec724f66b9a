//! SkySync - headless constituent sync
//!
//! Runs one sync cycle at startup, then one per interval, until a cycle
//! fails or the process is asked to stop.

use anyhow::Context;
use clap::Parser;
use skysync_cli::utils::logging::init_tracing;
use skysync_cli::utils::shutdown::cancel_on_signal;
use skysync_cli::{AppContext, Args};
use skysync_infra::config::{load, load_env_file};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // .env may carry RUST_LOG, so load it before the subscriber
    let env_file = load_env_file();
    init_tracing().map_err(|err| anyhow::anyhow!(err)).context("Failed to set up logging")?;
    info!(version = env!("CARGO_PKG_VERSION"), "SkySync starting");
    env_file.log();

    let config = load(args.config).context("Failed to load configuration")?;
    let context = AppContext::new(&config).context("Failed to initialize sync services")?;

    if let Some(token) = args.refresh_token.as_deref() {
        context.seed_refresh_token(token).context("Failed to store the initial refresh token")?;
    }

    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone());

    let exit = context.scheduler.run(cancel).await;
    info!(cycles = exit.cycles(), ?exit, "SkySync stopped");

    Ok(())
}
