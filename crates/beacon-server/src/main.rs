//! # beacon-server
//!
//! HTTP server for the beacon-range proximity estimator.
//!
//! This binary provides:
//! - REST API for distance estimation, ranking and parcel conversion
//! - OpenAPI documentation via Swagger UI
//! - Structured logging to file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package beacon-server
//!
//! # Custom configuration file, port override
//! BEACON_CONFIG=./config.toml BEACON_SERVER__PORT=8080 ./beacon-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::path::PathBuf;

use anyhow::Context;
use beacon_core::Config;
use beacon_server::api::create_router;
use beacon_server::logging;
use beacon_server::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

/// Environment variable naming the configuration file.
const CONFIG_PATH_ENV: &str = "BEACON_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(beacon_core::default_config_path, PathBuf::from);

    let config = Config::load_checked(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;

    logging::init(&config.logging)?;

    info!(config = %config_path.display(), "Starting beacon-server");

    let addr = config.bind_address();
    let app = create_router(AppState::shared(config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves when Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
