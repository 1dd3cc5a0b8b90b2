//! Parkwise HTTP Server Binary
//!
//! Main entry point for the parking recommendation REST API.
//! It loads the configuration, builds the zone index and adapters, sets up the HTTP
//! router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! GOOGLE_MAPS_API_KEY=... ZONES_CSV=data/parking_zones.csv \
//!   cargo run --bin parkwise-server
//! ```
//!
//! # Environment Variables
//!
//! - `PARKWISE_CONFIG`: Path of the TOML configuration (default: `parkwise.toml` search)
//! - `GOOGLE_MAPS_API_KEY`: Maps API key (required)
//! - `ZONE_SOURCE` / `ZONES_CSV`: Zone source type and CSV path
//! - `PARKWISE_WORKERS`: Enrichment worker count
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use parkwise::config::AppConfig;
use parkwise::http::{create_router, AppState};
use parkwise::services::ServiceFactory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Parkwise HTTP Server");

    let config = AppConfig::load()?;
    let service = ServiceFactory::from_config(&config).await?;
    info!(
        zones = service.zone_count(),
        workers = config.pipeline.workers,
        "Parking service initialized"
    );

    // Create application state
    let state = AppState::new(Arc::new(service));

    // Create router with all endpoints
    let app = create_router(state);

    let addr: SocketAddr = config.server.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
