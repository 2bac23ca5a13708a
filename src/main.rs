//! procgate stored-procedure gateway.
//!
//! Main entry point. Initializes logging, loads configuration, builds
//! the lazily-connecting database pool, and serves HTTP until shutdown.

use std::time::Duration;

use anyhow::{Context, Result};
use procgate::{server::AppState, start_server, Config};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting procgate stored-procedure gateway");

    let config = Config::load()?;
    info!(
        database_url = %config.database_url_masked(),
        host = %config.host,
        port = config.port,
        max_connections = config.database_max_connections,
        "Configuration loaded"
    );

    // Lazy pool: connections are opened on first per-request acquire,
    // not at startup, so a database outage surfaces as request-time
    // failures rather than preventing boot.
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_connection_timeout))
        .connect_lazy(&config.database_url)
        .context("Invalid database connection string")?;

    let addr = config.parse_server_addr()?;
    let state = AppState { pool: pool.clone() };

    start_server(state, addr, Duration::from_secs(config.request_timeout))
        .await
        .context("HTTP server failed")?;

    pool.close().await;
    info!("Database connections closed");

    info!("procgate shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,procgate=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
