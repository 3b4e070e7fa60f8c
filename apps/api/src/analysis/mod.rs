//! Resume Analysis — scores a resume and surfaces strengths, gaps, and fixes.
//!
//! One LLM call per request, routed through the shared queue. The model is
//! asked for strict JSON; any field it omits falls back to a serde default so
//! the user gets a partially filled card instead of an error.

pub mod handlers;
mod prompts;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::analysis::prompts::{ANALYZE_PROMPT_TEMPLATE, ANALYZE_SYSTEM};
use crate::llm_client::ThrottledLlm;

/// Structured analysis of one resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeAnalysis {
    /// 0-100. The LLM's overall judgment, not a deterministic metric.
    pub overall_score: u8,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub detected_skills: Vec<String>,
}

/// Analyzes a resume, optionally against a target role.
pub async fn analyze_resume(
    llm: &ThrottledLlm,
    resume_text: &str,
    target_role: Option<&str>,
) -> Result<ResumeAnalysis, AppError> {
    let prompt = build_analyze_prompt(resume_text, target_role);

    let analysis = llm
        .call_json::<ResumeAnalysis>(&prompt, ANALYZE_SYSTEM)
        .await?;

    info!(
        "Resume analyzed: score={}, {} strengths, {} suggestions",
        analysis.overall_score,
        analysis.strengths.len(),
        analysis.suggestions.len()
    );

    Ok(analysis)
}

fn build_analyze_prompt(resume_text: &str, target_role: Option<&str>) -> String {
    ANALYZE_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace(
            "{target_role}",
            target_role.unwrap_or("(no specific role given — judge general quality)"),
        )
}
