//! Scripted `TextGenerator` for tests.
//!
//! Replies are served in order; once the script runs out the fallback reply
//! is used, or the call fails when none is set. Every request is recorded.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::engine::{EngineError, GenerationRequest, TextGenerator};

#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    NoText,
    Fail(String),
}

#[derive(Debug, Default)]
pub struct FakeGenerator {
    script: Mutex<VecDeque<FakeReply>>,
    fallback: Option<FakeReply>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `text`.
    pub fn with_text(text: &str) -> Self {
        Self {
            fallback: Some(FakeReply::Text(text.to_string())),
            ..Self::default()
        }
    }

    /// Always fail with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            fallback: Some(FakeReply::Fail(message.to_string())),
            ..Self::default()
        }
    }

    pub fn push(&self, reply: FakeReply) {
        lock(&self.script).push_back(reply);
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, request: &GenerationRequest) -> Result<Option<String>, EngineError> {
        lock(&self.requests).push(request.clone());

        let reply = lock(&self.script).pop_front().or_else(|| self.fallback.clone());
        match reply {
            Some(FakeReply::Text(text)) => Ok(Some(text)),
            Some(FakeReply::NoText) => Ok(None),
            Some(FakeReply::Fail(message)) => Err(EngineError::Request(message)),
            None => Err(EngineError::Request(
                "FakeGenerator: no reply scripted".to_string(),
            )),
        }
    }
}
