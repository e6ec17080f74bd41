//! # Saree Label Server
//!
//! HTTP entry point for label preview, rendering and printing.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Label Server                                     │
//! │                                                                         │
//! │  Dashboard ───► HTTP (8787) ───► LabelPipeline ───► SpoolHost          │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                                  spool_dir/<job>.html   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use saree_label_server::{build_router, AppState, ServerConfig};
use saree_labels::LabelConfig;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Saree label server...");

    // Load configuration
    let config = ServerConfig::load()?;
    let labels = LabelConfig::load(config.label_config_path.clone())
        .context("Failed to load label configuration")?;
    info!(
        addr = %config.bind_address(),
        profile = %labels.print.profile,
        symbology = %labels.print.symbology,
        spool_dir = ?labels.dispatch.spool_dir,
        "Configuration loaded"
    );

    let app = build_router(Arc::new(AppState::new(labels)));

    let bind_addr = config.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!(addr = %bind_addr, "Label server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=saree_labels=trace` - Show trace for the label pipeline only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,saree_labels=debug,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
