//! ATS Optimization — keyword alignment between a resume and a job description.
//!
//! Shares the LLM queue with resume analysis, so a burst of requests across
//! both features still dispatches one paced call at a time.

pub mod handlers;
mod prompts;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::ats::prompts::{OPTIMIZE_PROMPT_TEMPLATE, OPTIMIZE_SYSTEM};
use crate::llm_client::ThrottledLlm;

/// ATS compatibility report for one resume / job-description pair.
/// Fields default when the model omits them; a partial report still renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtsReport {
    /// 0-100 estimated pass-through score for automated screening.
    pub ats_score: u8,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub formatting_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Scores a resume against a job description for ATS keyword coverage.
pub async fn optimize_for_ats(
    llm: &ThrottledLlm,
    resume_text: &str,
    job_description: &str,
) -> Result<AtsReport, AppError> {
    let prompt = build_optimize_prompt(resume_text, job_description);

    let report = llm.call_json::<AtsReport>(&prompt, OPTIMIZE_SYSTEM).await?;

    info!(
        "ATS report: score={}, {} matched, {} missing keywords",
        report.ats_score,
        report.matched_keywords.len(),
        report.missing_keywords.len()
    );

    Ok(report)
}

fn build_optimize_prompt(resume_text: &str, job_description: &str) -> String {
    OPTIMIZE_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{job_description}", job_description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_fills_defaults_for_missing_fields() {
        let json = r#"{"ats_score": 61, "missing_keywords": ["Terraform", "CI/CD"]}"#;
        let report: AtsReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.ats_score, 61);
        assert_eq!(report.missing_keywords, vec!["Terraform", "CI/CD"]);
        assert!(report.matched_keywords.is_empty());
        assert!(report.formatting_issues.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_report_full_deserializes_correctly() {
        let json = r#"{
            "ats_score": 78,
            "matched_keywords": ["Rust", "distributed systems"],
            "missing_keywords": ["Kafka"],
            "formatting_issues": ["Tables confuse most ATS parsers"],
            "recommendations": ["Add Kafka experience from the streaming project"]
        }"#;
        let report: AtsReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.ats_score, 78);
        assert_eq!(report.matched_keywords.len(), 2);
        assert_eq!(report.formatting_issues.len(), 1);
    }

    #[test]
    fn test_prompt_includes_both_documents() {
        let prompt = build_optimize_prompt("My resume body", "Senior Rust Engineer JD");
        assert!(prompt.contains("My resume body"));
        assert!(prompt.contains("Senior Rust Engineer JD"));
        assert!(!prompt.contains("{resume_text}"));
        assert!(!prompt.contains("{job_description}"));
    }
}
