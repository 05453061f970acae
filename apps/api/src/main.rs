mod config;
mod errors;
mod itglue;
mod llm_client;
mod models;
mod policy;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::itglue::{AssetSource, ItGlueClient};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting policy API v{}", env!("CARGO_PKG_VERSION"));

    // Chat completions with ordered model fallback
    let llm = LlmClient::new(config.azure.clone());
    if llm.is_configured() {
        info!("LLM client initialized (models: {})", llm.models().join(", "));
    } else {
        warn!("AZURE_OPENAI_API_KEY or AZURE_OPENAI_ENDPOINT not set; generation will fail");
    }

    let itglue = Arc::new(ItGlueClient::new(config.itglue.clone()));
    if itglue.is_configured() {
        info!("IT Glue client initialized ({})", config.itglue.base_url);
    } else {
        warn!("ITGLUE_API_KEY not set; organization picker disabled");
    }

    let state = AppState {
        llm,
        itglue,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
