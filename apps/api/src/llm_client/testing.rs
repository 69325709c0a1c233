//! Scripted transport and recording sleeper for exercising the retry loop without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::transport::{Sleeper, Transport, TransportError, TransportResponse};
use super::GeminiClient;

type Scripted = Result<TransportResponse, TransportError>;

/// Replays responses in order. Running past the script is a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    bodies: Mutex<Vec<Value>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            bodies: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, body: &Value) -> Result<TransportResponse, TransportError> {
        self.bodies.lock().unwrap().push(body.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("script exhausted".to_string())))
    }
}

/// Records requested delays and returns immediately. Clones share one log.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.delays().into_iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub fn client_with(transport: &Arc<ScriptedTransport>, sleeper: &RecordingSleeper) -> GeminiClient {
    GeminiClient::new(transport.clone()).with_sleeper(Arc::new(sleeper.clone()))
}

pub fn status(status: u16, body: &str) -> Scripted {
    Ok(TransportResponse {
        status,
        body: body.to_string(),
    })
}

pub fn transport_err(message: &str) -> Scripted {
    Err(TransportError(message.to_string()))
}

/// A successful `generateContent` body whose single candidate carries `text`.
pub fn candidate_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}
