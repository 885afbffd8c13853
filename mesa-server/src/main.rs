//! mesa-server: multi-tenant restaurant ordering backend
//!
//! Long-running service that:
//! - Serves each store's public menu and takes online orders
//! - Runs table service (PDV), the kitchen display and driver dispatch
//! - Pushes per-store change events to open screens over WebSocket

mod api;
mod auth;
mod config;
mod db;
mod error;
mod live;
mod services;
mod state;
mod validation;

use config::Config;
use error::BoxError;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mesa_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting mesa-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::create_router(state, &config);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("mesa-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("mesa-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
