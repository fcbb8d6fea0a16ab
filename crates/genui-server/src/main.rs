//! genui HTTP Server
//!
//! Axum server exposing the decision graph as a chat runnable: the model
//! either answers in plain text or picks one of the registered tools.

mod app;
mod config;
mod handlers;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genui_core::{GraphBuilder, LlmProvider};
use genui_runtime::OpenAiProvider;
use genui_tools::EnvCredentials;

use crate::app::build_router;
use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Initialize LLM provider
    let provider = OpenAiProvider::from_env()?;
    let model = provider.config().model.clone();

    match provider.health_check().await {
        Ok(true) => tracing::info!(model = %model, "✓ Connected to {}", provider.name()),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - requests will fail", provider.name());
        }
    }

    // Initialize tools
    let tools = genui_tools::default_registry(Arc::new(EnvCredentials));

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let graph = GraphBuilder::new()
        .provider(Arc::new(provider))
        .tools(tools)
        .model(model)
        .build()?;

    let app = build_router(AppState::new(graph), &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("🚀 genui server running on http://{}", config.bind_addr);
    tracing::info!("Allowed origins: {}", config.cors_origins.join(", "));
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /chat/invoke         - Run the decision graph");
    tracing::info!("  POST /chat/batch          - Run several inputs");
    tracing::info!("  GET  /chat/input_schema   - Input JSON Schema");
    tracing::info!("  GET  /chat/output_schema  - Output JSON Schema");
    tracing::info!("  GET  /chat/config_schema  - Config JSON Schema");

    axum::serve(listener, app).await?;

    Ok(())
}
