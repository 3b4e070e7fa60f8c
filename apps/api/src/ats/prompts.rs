// Prompts for the ATS optimization call.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const OPTIMIZE_SYSTEM: &str = JSON_ONLY_SYSTEM;

pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"You are an expert on applicant tracking systems (ATS).
Compare the resume below against the job description and report keyword coverage.

Job description:
---
{job_description}
---

Resume:
---
{resume_text}
---

Return a JSON object with exactly these keys:
- "ats_score": integer 0-100, estimated chance of passing automated screening
- "matched_keywords": array of strings, JD keywords present in the resume
- "missing_keywords": array of strings, important JD keywords absent from the resume
- "formatting_issues": array of strings, layout choices likely to break ATS parsing
- "recommendations": array of strings, concrete edits ordered by impact

Only list keywords that actually appear in the job description."#;
