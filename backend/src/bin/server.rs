//! Dashboard metrics HTTP server binary.
//!
//! This is the main entry point for the metrics REST API server.
//! It builds the record store, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory store
//! STORE_TYPE=local cargo run --bin dashboard-server
//!
//! # Run against Airtable
//! DATABASE_API_KEY=pat... DATABASE_BASE_ID=app... cargo run --bin dashboard-server
//!
//! # Run against a self-hosted NocoDB
//! STORE_TYPE=nocodb DATABASE_API_URL=https://noco.example.com \
//!   DATABASE_API_KEY=... DATABASE_BASE_ID=p_... cargo run --bin dashboard-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `DASHBOARD_CONFIG`: path to a `dashboard.toml`; when unset the standard
//!   locations are searched, then the environment is used
//! - `STORE_TYPE`, `DATABASE_*`, `*_TABLE`: see `db::config`
//! - `RUST_LOG`: Log filter (default: info)

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dashboard_metrics::db::{DashboardConfig, StoreBuilder};
use dashboard_metrics::http::{create_router, AppState};

fn store_builder() -> anyhow::Result<StoreBuilder> {
    if let Ok(path) = env::var("DASHBOARD_CONFIG") {
        info!("Loading store configuration from {}", path);
        return StoreBuilder::new()
            .from_config_file(&path)
            .with_context(|| format!("invalid configuration file {}", path));
    }

    if let Ok(file) = DashboardConfig::from_default_location() {
        info!("Loading store configuration from dashboard.toml");
        let kind = file
            .store_kind()
            .map_err(anyhow::Error::msg)
            .context("invalid store type in dashboard.toml")?;
        return Ok(StoreBuilder::new()
            .store_kind(kind)
            .config(file.to_store_config()?));
    }

    StoreBuilder::new()
        .from_env()
        .context("invalid store configuration in environment")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; `log` records from the library are forwarded too
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting dashboard metrics server");

    let builder = store_builder()?;
    let collections = builder.store_config().collections.clone();
    let store = builder.build().context("failed to create record store")?;
    info!("Record store initialized ({})", store.backend_name());

    // Create application state
    let state = AppState::new(store, collections);

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
