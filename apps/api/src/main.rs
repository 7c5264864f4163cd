mod config;
mod cv;
mod encoding;
mod errors;
mod extract;
mod layout;
mod llm_client;
mod optimize;
mod render;
mod routes;
mod state;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; invalid values abort startup.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Optimizer API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Default provider: {} (model: {})",
        config.ai_provider,
        config.model_for(config.ai_provider)
    );
    if config.api_key_for(config.ai_provider).is_none() {
        info!("No server-side API key for {}; requests must supply one", config.ai_provider);
    }

    // Build app state
    let state = AppState::new(config.clone())?;
    info!(
        "Location markers: {:?}, upload limit {} bytes",
        config.location_markers, config.max_upload_bytes
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
