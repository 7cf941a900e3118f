mod bootstrap;
mod error;
mod routes;
mod state;

use crate::bootstrap::config::CliArgs;
use crate::state::AppState;
use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use statrelay_sdk::StatsClient;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let config = bootstrap::config::relay_config(&args)?;

    if config.client.accept_invalid_certs {
        warn!(
            upstream = %config.client.base_url,
            "upstream TLS certificate verification is disabled"
        );
    }
    let client =
        StatsClient::from_config(&config.client).context("failed to build upstream client")?;
    let state = Arc::new(AppState { client });

    let app = bootstrap::app::axum_app(state);

    info!(addr = %config.addr, upstream = %config.client.base_url, "statrelay started");
    let tcp_listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(tcp_listener, app).await.context("server stopped")?;
    Ok(())
}
