use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use parley_core::config::ParleyConfig;
use parley_gateway::app;

/// Webhook-to-WebSocket chat relay.
#[derive(Debug, Parser)]
#[command(name = "parley-gateway", version, about)]
struct Cli {
    /// Path to parley.toml (default: ~/.parley/parley.toml).
    #[arg(long, env = "PARLEY_CONFIG")]
    config: Option<String>,

    /// Override gateway.bind.
    #[arg(long)]
    bind: Option<String>,

    /// Override gateway.port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "parley_gateway=info,parley_relay=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config / PARLEY_CONFIG > ~/.parley/parley.toml, then PARLEY_* env
    let mut config = ParleyConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        ParleyConfig::default()
    });
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    match config.relay.history_limit {
        Some(limit) => info!(limit, "replay history bounded"),
        None => info!("replay history unbounded (memory grows with every record)"),
    }

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let state = Arc::new(app::AppState::new(config));
    let router = app::build_router(state);

    info!("Parley gateway listening on {}", addr);
    info!("webhook: POST http://{}/webhook  viewers: ws://{}/ws", addr, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Parley gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
