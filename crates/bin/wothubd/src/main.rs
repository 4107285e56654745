//! # wothubd — Web of Things hub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Build the virtual things and start their background tasks
//! - Build the axum router around the thing registry
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no thing logic belongs here.

mod config;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use wothub_adapter_http_axum::state::AppState;
use wothub_adapter_virtual::{VirtualIntegration, VirtualOptions};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Things
    let mut integration = VirtualIntegration::new(VirtualOptions {
        sensor_interval: config.sensor_interval(),
        event_retention: config.event_retention(),
    })
    .context("building virtual things")?;
    let registry = integration
        .registry(config.things.title.as_str())
        .context("building thing registry")?;
    integration.start();

    // HTTP
    let state = AppState::new(registry).with_stream_buffer(config.server.stream_buffer);
    let app = wothub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(address = %bind_addr, "wothubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    integration.teardown().await;
    tracing::info!("wothubd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
