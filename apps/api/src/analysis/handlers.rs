//! Axum route handlers for the Resume Analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze_resume, ResumeAnalysis};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub target_role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: ResumeAnalysis,
}

/// POST /api/v1/resume/analyze
///
/// Analyzes a resume against an optional target role. The LLM call is queued
/// behind any other in-flight AI work; a full queue comes back as 429.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let analysis = analyze_resume(
        &state.llm,
        &request.resume_text,
        request.target_role.as_deref(),
    )
    .await?;

    Ok(Json(AnalyzeResponse { analysis }))
}
