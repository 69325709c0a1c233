// Prompt constants and response schema for remote resume analysis.

use serde_json::{json, Value};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

const RESUME_ANALYSIS_ROLE: &str = "You are an expert career coach and technical recruiter. \
    You review resumes for software, data, project management and design roles \
    and give candid, specific, actionable feedback.";

/// Resume analysis prompt template. Replace `{resume_text}` before sending.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume and return a JSON object with exactly these fields:

- "summary": two or three sentences describing the candidate's profile and seniority.
- "strengths": the candidate's strongest skills and achievements, one short phrase each.
- "recommendations": concrete improvements to the resume, most impactful first.
- "jobFits": job titles the candidate is a good fit for, best fit first.

Base every statement on the resume text. Do not invent experience the resume does not mention.

RESUME:
{resume_text}"#;

pub fn system_instruction() -> String {
    format!("{RESUME_ANALYSIS_ROLE} {JSON_ONLY_SYSTEM}")
}

pub fn build_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

/// Gemini response schema: all four fields required.
pub fn response_schema() -> Value {
    let string_list = json!({"type": "ARRAY", "items": {"type": "STRING"}});
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {"type": "STRING"},
            "strengths": string_list,
            "recommendations": string_list,
            "jobFits": string_list
        },
        "required": ["summary", "strengths", "recommendations", "jobFits"]
    })
}
