//! Entry point for procdash_agent. Parses config, starts logging, and serves
//! until Ctrl-C.

use anyhow::Context;
use clap::Parser;
use procdash_agent::{server, Agent, AgentConfig};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "procdash_agent=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let config = AgentConfig::parse();
    let listener = server::bind(config.addr()).await?;
    let agent = Agent::new(&config);

    agent
        .serve(listener, shutdown_signal())
        .await
        .context("agent server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
