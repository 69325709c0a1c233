// Resume analysis: the local and remote producers behind one contract,
// per-session run state, file upload, and the HTTP handlers.
// All Gemini calls go through llm_client.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod session;
pub mod upload;
