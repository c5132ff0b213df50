//! psynth-ws - legacy Photosynth collection upload service
//!
//! Accepts synther client uploads, assembles each committed collection into
//! a zip archive under the output root, and serves the minimal SOAP surface
//! the clients require.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;

use psynth_common::config;
use psynth_ws::{build_router, AppState};

/// Command-line arguments for psynth-ws
#[derive(Parser, Debug)]
#[command(name = "psynth-ws")]
#[command(about = "Legacy Photosynth collection upload service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PSYNTH_PORT")]
    port: Option<u16>,

    /// Folder receiving session working trees and committed archives
    #[arg(short, long)]
    output_root: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Psynth upload service (psynth-ws) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let toml_config = config::load_toml_config().unwrap_or_default();
    let port = args.port.or(toml_config.port).unwrap_or(8080);

    let output_root =
        config::resolve_output_root(args.output_root.as_deref(), "PSYNTH_OUTPUT_ROOT");
    std::fs::create_dir_all(&output_root)
        .with_context(|| format!("Failed to create output root {}", output_root.display()))?;
    info!("Output root: {}", output_root.display());

    let state = AppState::new(output_root);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("psynth-ws listening on http://{}", addr);
    info!("Service endpoint: POST /photosynthws/PhotosynthService.asmx");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
