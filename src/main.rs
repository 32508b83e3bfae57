//! Relay Gateway - HTTP front end for an ESP8266 relay board
//!
//! Proxies status polls and relay commands to the device and keeps the
//! last known status to answer polls while the device is unreachable.

mod api;
mod cache;
mod config;
mod device;
mod error;
mod models;
mod net;
mod state;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_gateway=info,tower_http=debug".into()),
        )
        .init();

    tracing::info!("Starting relay-gateway...");

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!("Configuration loaded");

    let state = AppState::new(config.device.clone())?;
    tracing::info!(
        "ESP8266 endpoints: {} and {}/{{relay_id}} (timeout {}s)",
        state.device.config().status_url(),
        state.device.config().control_url(),
        config.device.timeout_secs
    );

    let static_dir = PathBuf::from(&config.server.static_dir);
    if !static_dir.join("index.html").is_file() {
        tracing::warn!("No index.html in {}, the web UI will 404", static_dir.display());
    }
    tracing::info!("Serving static files from {}", static_dir.display());

    // Build application router
    let cors = CorsLayer::permissive();

    let app = api::app(state, &static_dir).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    tracing::info!(
        "Listening on {} (LAN address {}:{})",
        addr,
        net::local_ip(),
        config.server.port
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
