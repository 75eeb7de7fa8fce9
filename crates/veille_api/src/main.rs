//! `veille-api` server entry point.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio::net::TcpListener;
use veille_api::{build_router, AppState, ServerConfig};
use veille_core::db::open_db;
use veille_core::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_logging(config.log_level(), config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let state = AppState::new(conn, config.cors_origins.clone());

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "event=server_start module=api status=ok bind={} db_path={}",
        config.bind,
        config.db_path.display()
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=signal_listen module=api status=error error={err}");
    }
}
