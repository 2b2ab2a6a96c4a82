//! Argus web server
//!
//! Run with: cargo run -p argus-web

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use argus_dashboard::{HttpBackend, SocketIoChannel};
use argus_web::config::Config;
use argus_web::router::build_router;
use argus_web::state::AppState;
use argus_web::tasks;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("argus_web=debug,argus_dashboard=debug,info")),
        )
        .init();

    info!("👁 Argus starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().context("loading argus.toml")?;
    info!(backend = %config.backend.url, variant = %config.dashboard.variant, "configuration loaded");

    let backend = HttpBackend::new(&config.backend.url, config.backend_timeout())?
        .with_start_search_path(config.start_search_path()?);
    let (channel, events) = SocketIoChannel::spawn(backend.base_url())?;

    let state = Arc::new(AppState::new(config.clone(), Arc::new(backend), Arc::new(channel))?);
    tasks::spawn_all(state.clone(), events);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("🚀 Server listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
