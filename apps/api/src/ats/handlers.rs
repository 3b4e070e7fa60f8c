//! Axum route handlers for the ATS Optimization API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::ats::{optimize_for_ats, AtsReport};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub report: AtsReport,
}

/// POST /api/v1/ats/optimize
///
/// Scores a resume against a job description for ATS compatibility.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let report =
        optimize_for_ats(&state.llm, &request.resume_text, &request.job_description).await?;

    Ok(Json(OptimizeResponse { report }))
}
