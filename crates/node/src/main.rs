//! Trebuchet node command line.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::RunCmd;
use std::sync::Arc;
use tc_db::TrebuchetBackend;
use tc_gateway_server::service::start_server;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

const GREET_IMPL_NAME: &str = "Trebuchet";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let run_cmd = RunCmd::parse();
    let chain_config = Arc::new(run_cmd.chain_config()?);

    tracing::info!("🏹 {} REST Gateway", GREET_IMPL_NAME);
    tracing::info!("🌐 Network: {}", chain_config.network.name());

    let backend = TrebuchetBackend::open(
        &run_cmd.db_params.db_url,
        &run_cmd.db_params.db_name,
        Arc::clone(&chain_config),
    )
    .await
    .context("Initializing storage backend")?;

    // Primary-sort indexes are an operational prerequisite of the cursor
    // queries, not an optimization.
    backend.ensure_indexes().await.context("Creating storage indexes")?;

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Error waiting for shutdown signal: {err}");
            }
            shutdown.notify_waiters();
        });
    }

    start_server(backend, run_cmd.gateway_params.as_gateway_server_config(), shutdown).await
}
