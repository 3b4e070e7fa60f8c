mod analysis;
mod ats;
mod config;
mod errors;
mod llm_client;
mod queue;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, ThrottledLlm};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter_directive(&config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ascent API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the LLM client behind its request queue
    let queue_config = config.llm_queue_config();
    info!(
        "LLM request queue: min_delay={}ms, capacity={}, timeout={:?}",
        queue_config.min_delay.as_millis(),
        queue_config.capacity,
        queue_config.operation_timeout
    );
    let llm = ThrottledLlm::new(
        LlmClient::new(config.anthropic_api_key.clone()),
        queue_config,
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        llm,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Fallback filter used when RUST_LOG is unset. Tracing targets use the
/// normalized crate name (underscores), not the package name (hyphens), so
/// the directive must be built from `CARGO_CRATE_NAME` or our own events
/// would never match.
fn default_filter_directive(rust_log: &str) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), rust_log)
}
