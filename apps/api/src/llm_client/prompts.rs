// Shared prompt fragments. Each feature that calls the model keeps its own prompts.rs
// next to it; only cross-cutting fragments live here.

/// Appended to every system instruction. The response schema already forces JSON,
/// this keeps the model from wrapping it in prose.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
