pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::analysis::handlers as analysis_handlers;
use crate::ats::handlers as ats_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resume/analyze",
            post(analysis_handlers::handle_analyze),
        )
        .route("/api/v1/ats/optimize", post(ats_handlers::handle_optimize))
        .with_state(state)
}
