// Prompts for the resume analysis call.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const ANALYZE_SYSTEM: &str = JSON_ONLY_SYSTEM;

pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"You are an experienced career coach reviewing a resume.

Target role: {target_role}

Resume:
---
{resume_text}
---

Return a JSON object with exactly these keys:
- "overall_score": integer 0-100
- "summary": one-paragraph overall assessment
- "strengths": array of strings, the strongest aspects of this resume
- "weaknesses": array of strings, the weakest aspects
- "suggestions": array of strings, concrete edits the candidate should make
- "detected_skills": array of strings, skills evidenced in the resume

Be specific and reference the resume's own content. Do not invent experience."#;
