//! vecdeckd — the VecDeck daemon.
//!
//! Single binary that assembles the console subsystems:
//! - HTTP client adapter for the vector database
//! - Connection manager + TTL cache (with background sweeper)
//! - Schedule registry + collection poller
//! - Event bridge
//! - HTTP API + websocket event channel
//!
//! # Usage
//!
//! ```text
//! vecdeckd serve --port 3000 --connection-ttl 86400 --sweep-interval 60
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use vecdeck_api::ApiState;
use vecdeck_client::{ClientConnector, HttpConnector};
use vecdeck_conn::ConnectionManager;
use vecdeck_events::EventBridge;
use vecdeck_poller::PollingService;
use vecdeck_scheduler::ScheduleRegistry;

#[derive(Parser)]
#[command(name = "vecdeckd", about = "VecDeck console daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the console API.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Sliding TTL for cached connections, in seconds.
        #[arg(long, default_value = "86400")]
        connection_ttl: u64,

        /// Cache sweep interval in seconds.
        #[arg(long, default_value = "60")]
        sweep_interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vecdeckd=debug,vecdeck=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            connection_ttl,
            sweep_interval,
        } => run_serve(port, connection_ttl, sweep_interval).await,
    }
}

async fn run_serve(port: u16, connection_ttl: u64, sweep_interval: u64) -> anyhow::Result<()> {
    info!("VecDeck daemon starting");

    // ── Initialize subsystems ──────────────────────────────────

    let connector = Arc::new(HttpConnector::new());
    let sdk_version = connector.sdk_version();

    let manager = Arc::new(ConnectionManager::new(
        connector,
        Duration::from_secs(connection_ttl),
    ));
    info!(ttl_secs = connection_ttl, "connection manager initialized");

    let registry = Arc::new(ScheduleRegistry::new());
    let bridge = EventBridge::new();
    let poller = Arc::new(PollingService::new(
        manager.clone(),
        registry.clone(),
        bridge.clone(),
    ));
    info!("schedule registry and poller initialized");

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Background tasks ───────────────────────────────────────

    // Cache sweeper: reclaims expired connections; reads stay correct
    // without it.
    let sweeper_manager = manager.clone();
    let sweeper_shutdown = shutdown_rx.clone();
    let sweeper_handle = tokio::spawn(async move {
        sweeper_manager
            .cache()
            .run_sweeper(Duration::from_secs(sweep_interval), sweeper_shutdown)
            .await;
    });

    // ── Start API server ───────────────────────────────────────

    let state = ApiState {
        manager,
        poller,
        bridge,
        sdk_version,
    };
    let router = vecdeck_api::build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wind down background work.
    registry.stop_all().await;
    let _ = sweeper_handle.await;

    info!("VecDeck daemon stopped");
    Ok(())
}
