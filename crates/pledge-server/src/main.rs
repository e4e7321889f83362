//! # pledge-server
//!
//! REST API server for the Pledge4Peace civic-engagement platform.
//!
//! This binary provides:
//! - **Admin analytics** (axum): point-in-time summaries, daily time-series,
//!   paginated pledge listings, and a merged recent-activity feed
//! - **Solution submission** guarded by per-party and per-campaign caps
//! - **Peace Seal scoring** for advisor reviews of company questionnaires
//! - **SQLite persistence** through the pledge-store crate

mod activity;
mod aggregate;
mod api;
mod auth;
mod cache;
mod config;
mod error;
mod limits;
mod scoring;
mod timeseries;

use tracing::info;
use tracing_subscriber::EnvFilter;

use pledge_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pledge_server=debug")),
        )
        .init();

    info!("Starting Pledge4Peace API server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the database (runs migrations)
    // -----------------------------------------------------------------------
    let db = match config.database_path {
        Some(ref path) => Database::open_at(path)?,
        None => Database::new()?,
    };

    let http_addr = config.http_addr;
    let app_state = AppState::new(db, config);

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Periodic summary-cache cleanup (every 5 minutes).
    let cache = app_state.summary_cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            cache.purge_expired().await;
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    // tokio::select! ensures that if either the HTTP server or a shutdown
    // signal arrives, we exit cleanly.
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
