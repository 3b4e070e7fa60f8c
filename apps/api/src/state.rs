use crate::config::Config;
use crate::llm_client::ThrottledLlm;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The throttled LLM facade. Every feature module calls through this so
    /// all traffic shares one rate-limited queue.
    pub llm: ThrottledLlm,
    #[allow(dead_code)]
    pub config: Config,
}
