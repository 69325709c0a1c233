/// LLM client: the single point of entry for Gemini `generateContent` calls.
///
/// No other module talks to the Gemini API directly. Every call goes through
/// `GeminiClient`, which owns the retry policy and the response-shape checks.
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod testing;
pub mod transport;

use transport::{Sleeper, TokioSleeper, Transport, TransportResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const TEMPERATURE: f32 = 0.5;
const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(1000);
/// Upstream bodies quoted in error messages are cut to this many characters.
const MAX_QUOTED_BODY: usize = 300;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Every attempt hit a 429, a 5xx, or a transport failure.
    #[error("remote call failed after {attempts} attempts: {last_failure}")]
    RemoteCall {
        attempts: u32,
        last_status: Option<u16>,
        last_failure: String,
    },

    /// A 4xx other than 429. Never retried.
    #[error("remote request rejected (status {status}): {message}")]
    RequestRejected { status: u16, message: String },

    /// The call succeeded but the payload is not the expected structure. Never retried.
    #[error("malformed response: {0}")]
    ResponseShape(String),

    #[error("failed to encode request: {0}")]
    Encode(serde_json::Error),
}

/// Retry schedule: `max_attempts` tries, waiting `initial_backoff × 2^(n-1)` before retry `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_backoff: INITIAL_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Delay before zero-based `attempt`. Zero for the first attempt.
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.initial_backoff * (1u32 << (attempt - 1).min(16))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    system_instruction: RequestContent<'a>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part carrying text in the first candidate.
    pub fn text(&self) -> Result<&str, LlmError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| LlmError::ResponseShape("response has no candidates".to_string()))?;
        let content = candidate
            .content
            .as_ref()
            .ok_or_else(|| LlmError::ResponseShape("candidate has no content".to_string()))?;
        content
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
            .ok_or_else(|| LlmError::ResponseShape("candidate content has no text".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps Gemini `generateContent` with retry logic and structured output helpers.
#[derive(Clone)]
pub struct GeminiClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl GeminiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Sends `body` until it succeeds, is rejected, or attempts run out.
    /// Retries on 429, 5xx and transport failures; attempts never overlap.
    pub async fn call(&self, body: &Value) -> Result<GenerateContentResponse, LlmError> {
        let mut last_status: Option<u16> = None;
        let mut last_failure: Option<String> = None;

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                let delay = self.policy.backoff_before(attempt);
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                self.sleeper.sleep(delay).await;
            }

            let response = match self.transport.post_json(body).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Gemini transport error: {e}");
                    last_status = None;
                    last_failure = Some(format!("transport error: {e}"));
                    continue;
                }
            };

            if response.is_retryable() {
                warn!("Gemini API returned {}: {}", response.status, quote(&response.body));
                last_status = Some(response.status);
                last_failure = Some(format!("HTTP {}: {}", response.status, quote(&response.body)));
                continue;
            }

            if response.is_client_error() {
                return Err(rejected(response));
            }

            if !response.is_success() {
                return Err(LlmError::ResponseShape(format!(
                    "unexpected HTTP {}: {}",
                    response.status,
                    quote(&response.body)
                )));
            }

            let parsed: GenerateContentResponse = serde_json::from_str(&response.body)
                .map_err(|e| LlmError::ResponseShape(format!("response body is not valid JSON: {e}")))?;

            debug!("Gemini call succeeded on attempt {}", attempt + 1);
            return Ok(parsed);
        }

        Err(LlmError::RemoteCall {
            attempts: self.policy.max_attempts,
            last_status,
            last_failure: last_failure.unwrap_or_else(|| "no attempt was made".to_string()),
        })
    }

    /// Calls the model with a JSON response schema and deserializes the returned text as `T`.
    /// A missing text payload or a payload that does not fit `T` is a `ResponseShape` error.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
        response_schema: &Value,
    ) -> Result<T, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
            system_instruction: RequestContent {
                role: None,
                parts: vec![RequestPart { text: system }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema,
                temperature: TEMPERATURE,
            },
        };
        let body = serde_json::to_value(&request).map_err(LlmError::Encode)?;

        let response = self.call(&body).await?;
        let text = strip_json_fences(response.text()?);

        serde_json::from_str(text)
            .map_err(|e| LlmError::ResponseShape(format!("payload does not match schema: {e}")))
    }
}

fn rejected(response: TransportResponse) -> LlmError {
    let message = serde_json::from_str::<GeminiError>(&response.body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| quote(&response.body));
    LlmError::RequestRejected {
        status: response.status,
        message,
    }
}

fn quote(body: &str) -> String {
    if body.chars().count() <= MAX_QUOTED_BODY {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_QUOTED_BODY).collect();
    format!("{cut}…")
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{
        candidate_body, client_with, status, transport_err, RecordingSleeper, ScriptedTransport,
    };
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Greeting {
        greeting: String,
    }

    fn schema() -> Value {
        json!({"type": "OBJECT", "properties": {"greeting": {"type": "STRING"}}, "required": ["greeting"]})
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_backoff_doubles_from_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_before(0), Duration::ZERO);
        assert_eq!(policy.backoff_before(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_before(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_before(3), Duration::from_millis(4000));
    }

    #[tokio::test]
    async fn test_three_server_errors_exhaust_retries() {
        let transport = ScriptedTransport::new(vec![status(503, ""), status(503, ""), status(503, "down")]);
        let sleeper = RecordingSleeper::default();
        let client = client_with(&transport, &sleeper);

        let err = client.call(&json!({})).await.unwrap_err();
        match err {
            LlmError::RemoteCall {
                attempts,
                last_status,
                last_failure,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_status, Some(503));
                assert!(last_failure.contains("down"));
            }
            other => panic!("expected RemoteCall, got {other:?}"),
        }
        assert_eq!(transport.calls(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
        assert!(sleeper.total() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_in_virtual_time() {
        let transport = ScriptedTransport::new(vec![status(503, ""), status(503, ""), status(503, "")]);
        let client = GeminiClient::new(transport.clone());

        let start = tokio::time::Instant::now();
        let err = client.call(&json!({})).await.unwrap_err();
        assert!(matches!(err, LlmError::RemoteCall { .. }));
        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_client_error_fails_immediately() {
        let transport = ScriptedTransport::new(vec![status(
            400,
            r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#,
        )]);
        let sleeper = RecordingSleeper::default();
        let client = client_with(&transport, &sleeper);

        let err = client.call(&json!({})).await.unwrap_err();
        match err {
            LlmError::RequestRejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected RequestRejected, got {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let transport = ScriptedTransport::new(vec![
            status(429, "slow down"),
            status(200, &candidate_body(r#"{"greeting": "hi"}"#)),
        ]);
        let sleeper = RecordingSleeper::default();
        let client = client_with(&transport, &sleeper);

        let greeting: Greeting = client.call_json("prompt", "system", &schema()).await.unwrap();
        assert_eq!(greeting.greeting, "hi");
        assert_eq!(transport.calls(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(1000)]);
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let transport = ScriptedTransport::new(vec![
            transport_err("connection refused"),
            transport_err("request timed out"),
            status(200, &candidate_body(r#"{"greeting": "hello"}"#)),
        ]);
        let sleeper = RecordingSleeper::default();
        let client = client_with(&transport, &sleeper);

        let greeting: Greeting = client.call_json("p", "s", &schema()).await.unwrap();
        assert_eq!(greeting.greeting, "hello");
        assert_eq!(transport.calls(), 3);
        assert_eq!(sleeper.delays().len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_transport_errors_report_last_message() {
        let transport = ScriptedTransport::new(vec![
            transport_err("connection refused"),
            transport_err("connection refused"),
            transport_err("request timed out"),
        ]);
        let client = client_with(&transport, &RecordingSleeper::default());

        match client.call(&json!({})).await.unwrap_err() {
            LlmError::RemoteCall {
                last_status,
                last_failure,
                ..
            } => {
                assert_eq!(last_status, None);
                assert!(last_failure.contains("timed out"));
            }
            other => panic!("expected RemoteCall, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_redirect_is_shape_error_not_rejection() {
        let transport = ScriptedTransport::new(vec![status(302, "moved")]);
        let sleeper = RecordingSleeper::default();
        let client = client_with(&transport, &sleeper);

        match client.call(&json!({})).await.unwrap_err() {
            LlmError::ResponseShape(message) => assert!(message.contains("302")),
            other => panic!("expected ResponseShape, got {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_missing_candidates_is_shape_error_without_retry() {
        let transport = ScriptedTransport::new(vec![status(200, r#"{"candidates": []}"#)]);
        let sleeper = RecordingSleeper::default();
        let client = client_with(&transport, &sleeper);

        let err = client
            .call_json::<Greeting>("p", "s", &schema())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::ResponseShape(_)));
        assert_eq!(transport.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_shape_error() {
        let transport = ScriptedTransport::new(vec![status(200, "<html>gateway</html>")]);
        let client = client_with(&transport, &RecordingSleeper::default());

        let err = client.call(&json!({})).await.unwrap_err();
        assert!(matches!(err, LlmError::ResponseShape(_)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_fenced_payload_is_accepted() {
        let transport = ScriptedTransport::new(vec![status(
            200,
            &candidate_body("```json\n{\"greeting\": \"fenced\"}\n```"),
        )]);
        let client = client_with(&transport, &RecordingSleeper::default());

        let greeting: Greeting = client.call_json("p", "s", &schema()).await.unwrap();
        assert_eq!(greeting.greeting, "fenced");
    }

    #[tokio::test]
    async fn test_request_body_shape() {
        let transport = ScriptedTransport::new(vec![status(200, &candidate_body(r#"{"greeting": "x"}"#))]);
        let client = client_with(&transport, &RecordingSleeper::default());

        let _: Greeting = client
            .call_json("the prompt", "the system", &schema())
            .await
            .unwrap();

        let bodies = transport.bodies();
        assert_eq!(bodies.len(), 1);
        let body = &bodies[0];
        assert_eq!(body["contents"][0]["parts"][0]["text"], "the prompt");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "the system");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert_eq!(body["generationConfig"]["responseSchema"], schema());
    }

    #[test]
    fn test_long_bodies_are_truncated_in_errors() {
        let long = "x".repeat(MAX_QUOTED_BODY + 50);
        let err = rejected(TransportResponse {
            status: 403,
            body: long,
        });
        match err {
            LlmError::RequestRejected { message, .. } => {
                assert_eq!(message.chars().count(), MAX_QUOTED_BODY + 1)
            }
            other => panic!("expected RequestRejected, got {other:?}"),
        }
    }
}
