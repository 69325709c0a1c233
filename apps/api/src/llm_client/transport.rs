//! The two seams of the retry loop: how a request body reaches the endpoint, and how
//! the loop waits between attempts. Production uses `reqwest` and `tokio::time::sleep`;
//! tests script both.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Status and raw body of one HTTP attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Any 4xx except 429. The request itself is at fault.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status) && self.status != 429
    }

    /// 429 and every 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || self.status >= 500
    }
}

/// The request never produced a status: connect failure, timeout, broken body.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, body: &Value) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// POSTs JSON to a fixed endpoint with the API key in the `x-goog-api-key` header.
pub struct ReqwestTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ReqwestTransport {
    /// `timeout` bounds each attempt, not the whole retry sequence.
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, body: &Value) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(describe)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(describe)?;

        Ok(TransportResponse { status, body })
    }
}

fn describe(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError(format!("request timed out: {e}"))
    } else if e.is_connect() {
        TransportError(format!("connection failed: {e}"))
    } else {
        TransportError(e.to_string())
    }
}
