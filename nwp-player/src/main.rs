//! NeWPlayer engine service (nwp-player) - Main entry point
//!
//! Runs the player engine behind a small HTTP/SSE control API. Tracks,
//! lyrics and personal radio batches come from the configured music API
//! server; session state is kept in a local SQLite database.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nwp_common::config::TomlConfig;
use nwp_player::api;
use nwp_player::config::EngineConfig;
use nwp_player::persistence::SqliteStateStore;
use nwp_player::playback::{ClockOutput, PlayerEngine};
use nwp_player::resolver::HttpTrackResolver;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "nwp_player=debug,nwp_common=info,tower_http=info";

/// Command-line arguments for nwp-player
#[derive(Parser, Debug)]
#[command(name = "nwp-player")]
#[command(about = "Music player engine service")]
#[command(version)]
struct Args {
    /// Path to TOML config file (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(short, long, env = "NWP_DATABASE")]
    database: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "NWP_PORT")]
    port: Option<u16>,

    /// Music API server base URL (overrides config)
    #[arg(long, env = "NWP_API_BASE_URL")]
    api_base_url: Option<String>,
}

/// Filter used when `RUST_LOG` is unset: the configured level, else the default
fn fallback_filter(configured: Option<&str>) -> EnvFilter {
    configured
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before logging starts so its filter can apply
    let config_result = TomlConfig::load(args.config.as_deref());
    let log_level = config_result
        .as_ref()
        .ok()
        .and_then(|c| c.logging.level.clone());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter(log_level.as_deref())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config_result.context("Failed to load configuration")?;
    let database_path = args.database.unwrap_or(config.database_path);
    let port = args.port.unwrap_or(config.port);
    let api_base_url = args.api_base_url.unwrap_or(config.api_base_url);

    info!("Starting NeWPlayer engine on port {}", port);
    info!("Database: {}", database_path.display());
    info!("Music API: {}", api_base_url);

    let db_pool = nwp_common::db::init_database(&database_path)
        .await
        .context("Failed to initialize database")?;

    let resolver = HttpTrackResolver::new(&api_base_url, config.api_cookie.clone())
        .context("Failed to create track resolver")?;
    if config.api_cookie.is_none() {
        warn!("No API cookie configured; personal radio and dislike reports may be rejected");
    }
    let store = SqliteStateStore::new(db_pool);

    let (remote_tx, remote_rx) = mpsc::channel(32);
    let engine = PlayerEngine::builder(Arc::new(resolver), Arc::new(store))
        .config(EngineConfig::default())
        .output_factory(ClockOutput::factory())
        .remote_commands(remote_rx)
        .spawn()
        .await
        .context("Failed to start player engine")?;

    let app = api::create_router(api::AppState {
        engine: engine.clone(),
        remote_tx,
        port,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Err(e) = engine.shutdown().await {
        warn!("Engine shutdown failed: {}", e);
    }
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
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
