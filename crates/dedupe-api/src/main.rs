//! # dedupe-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the YAML file named
//! by `DEDUPE_CONFIG` (optional) overridden by environment variables.
//! Binds to `PORT` (default 8080).

use std::path::PathBuf;

use anyhow::Context;
use dedupe_core::DedupeConfig;
use dedupe_store::LedgerBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let config_file = std::env::var_os("DEDUPE_CONFIG").map(PathBuf::from);
    let config = DedupeConfig::load(config_file.as_deref(), |key| std::env::var(key).ok())
        .map_err(|e| {
            tracing::error!("Invalid configuration: {e}");
            e
        })
        .context("loading dedupe configuration")?;

    tracing::info!(
        unique_prefix = %config.unique_namespace_prefix,
        unique_root = %config.unique_root_dir.display(),
        legacy_prefix = %config.legacy_namespace_prefix,
        legacy_root = %config.legacy_root_dir.display(),
        "configuration loaded"
    );

    // Initialize database pool (optional — absent means in-memory ledger).
    let db_pool = dedupe_store::db::init_pool()
        .await
        .map_err(|e| {
            tracing::error!("Database initialization failed: {e}");
            e
        })
        .context("initializing database")?;
    let ledger = LedgerBackend::from_pool(db_pool);
    tracing::info!(ledger = ledger.kind(), "name ledger ready");

    let app = dedupe_api::app(dedupe_api::AppState::new(config, ledger));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Dedupe API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
