//! CidGate HTTP Gateway
//!
//! Serves content-addressed storage over HTTP: uploads, path-addressed
//! writes, and name-or-CID reads backed by a RocksDB block store.

use axum::{routing::get, Router};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cidgate_gateway::{content_api, AppState, GatewayConfig};

#[derive(Parser)]
#[command(name = "cidgate-gateway")]
#[command(about = "CidGate content-addressed storage gateway")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, default_value = "cidgate.toml")]
    config: PathBuf,

    /// HTTP listen address (overrides config)
    #[arg(long)]
    http_addr: Option<String>,

    /// Block store directory (overrides config)
    #[arg(long, env = "CIDGATE_BLOCK_STORE_PATH")]
    block_store_path: Option<PathBuf>,

    /// Use an in-memory block store (development only)
    #[arg(long, default_value = "false")]
    memory_only: bool,
}

async fn health() -> &'static str {
    "OK"
}

async fn version() -> &'static str {
    concat!("cidgate-gateway/", env!("CARGO_PKG_VERSION"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let config = GatewayConfig::load_or_default(&cli.config)
        .with_env_overrides()
        .with_overrides(cli.block_store_path, cli.http_addr);
    config.validate()?;

    info!(
        http = %config.http_addr,
        block_store = ?config.block_store_path,
        chunk_size = config.chunk_size,
        "Starting CidGate gateway"
    );

    let state = if cli.memory_only {
        warn!("Running with in-memory block store, nothing will persist");
        Arc::new(AppState::in_memory(&config)?)
    } else {
        Arc::new(AppState::open(&config)?)
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .merge(content_api::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("HTTP server listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.close()?;
    info!("Gateway shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
