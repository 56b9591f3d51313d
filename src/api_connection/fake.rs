//! Scripted transport for tests and offline runs.
//!
//! Replies are served from a queue first, then from the default reply. Every
//! call is counted and its request recorded so tests can assert on how often
//! the model was actually reached.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::connection::{ApiConnectionError, GenerationRequest, GenerativeTransport};

#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Fail(String),
}

#[derive(Debug)]
pub struct FakeTransport {
    queued: Mutex<VecDeque<FakeReply>>,
    default_reply: FakeReply,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeTransport {
    /// Always answers with `text`.
    pub fn replying(text: &str) -> Self {
        Self::with_default(FakeReply::Text(text.to_string()))
    }

    /// Always fails with an API error whose body is `message`.
    pub fn failing(message: &str) -> Self {
        Self::with_default(FakeReply::Fail(message.to_string()))
    }

    fn with_default(default_reply: FakeReply) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default_reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-shot reply served before the default.
    pub fn then(self, reply: FakeReply) -> Self {
        if let Ok(mut queued) = self.queued.lock() {
            queued.push_back(reply);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.requests().last().map(|r| r.prompt.clone())
    }
}

#[async_trait]
impl GenerativeTransport for FakeTransport {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let reply = self
            .queued
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            FakeReply::Text(text) => Ok(text),
            FakeReply::Fail(message) => Err(ApiConnectionError::ApiError {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                error_body: message,
            }),
        }
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
