//! lexicon-server
//!
//! Axum host for the lexicon tools. Each tool is callable over HTTP with its
//! arguments as the JSON body; all calls share one lexicon session.

mod handlers;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lexicon_tools::{Collaborators, LexiconConfig, SourceConfig};

use crate::handlers::{execute_tool, health_check, list_tools, session_status};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before reading RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = LexiconConfig::from_env()?;
    let collaborators = Collaborators::from_config(&SourceConfig::from_env())?;
    let state = AppState::new(config, &collaborators);

    tracing::info!(tools = ?state.tools.names(), "Registered lexicon tools");
    if state.source_name.starts_with("Mock") {
        tracing::warn!("LEXICON_SOURCE_URL not set, serving built-in sample lexicons");
    }

    let app = router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("lexicon-server listening on http://{addr}");
    tracing::info!("  GET  /api/tools         - Tool schemas");
    tracing::info!("  POST /api/tools/{{name}}  - Execute a tool");
    tracing::info!("  GET  /api/session       - Loaded lexicon and pending plans");

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(execute_tool))
        .route("/api/session", get(session_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
