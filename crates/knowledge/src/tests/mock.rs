//! Scripted `LlmClient` for generation tests.

use async_trait::async_trait;
use companion_core::{AppError, AppResult};
use companion_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) struct MockLlm {
    reply: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<LlmRequest>>,
}

impl MockLlm {
    pub(crate) fn replying(text: &str) -> Self {
        Self::with_reply(Ok(text.to_string()))
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self::with_reply(Err(message.to_string()))
    }

    fn with_reply(reply: Result<String, String>) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<LlmRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                content: text.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 20),
                done: true,
            }),
            Err(message) => Err(AppError::Llm(message.clone())),
        }
    }
}
