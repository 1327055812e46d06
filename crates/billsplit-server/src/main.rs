//! # billsplit-server
//!
//! HTTP API for the bill splitter.
//!
//! Every use case is one RPC procedure served under `/rpc/<name>`: queries
//! (`billList`, `billGet`, `billGetImages`, `billSplit`) over `GET`, every
//! mutation over `POST`. Bills are persisted in a SQLite document store,
//! one row per bill.

mod api;
mod config;
mod error;
mod input;

use tracing::info;
use tracing_subscriber::EnvFilter;

use billsplit_shared::constants::APP_NAME;
use billsplit_store::Database;

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
                .unwrap_or_else(|_| EnvFilter::new("info,billsplit_server=debug")),
        )
        .init();

    info!("Starting {APP_NAME} server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the document store (runs migrations)
    // -----------------------------------------------------------------------
    let db = Database::open_url(&config.database_url)?;
    let http_addr = config.http_addr();
    let app_state = AppState::new(db, config);

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
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
