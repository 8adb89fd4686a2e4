//! Deterministic provider that replays queued responses

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{FinishReason, GenerateRequest, GenerateResponse, LlmProvider};
use crate::agents::domain::{Content, Part, Role};
use crate::agents::error::{LlmError, LlmResult};

/// Provider that returns pre-scripted responses in order and records every
/// request it receives. Once the script runs out it fails with a network
/// error, which the agent reports as the model being unavailable.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<LlmResult<GenerateResponse>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a full response
    pub fn push(&self, response: GenerateResponse) -> &Self {
        self.lock_script().push_back(Ok(response));
        self
    }

    /// Queue a plain text answer
    pub fn push_text(&self, text: &str) -> &Self {
        self.push(GenerateResponse {
            content: Content::model_text(text),
            finish_reason: FinishReason::Stop,
        })
    }

    /// Queue a function call with no accompanying text
    pub fn push_function_call(&self, name: &str, args: Value) -> &Self {
        self.push(GenerateResponse {
            content: Content {
                role: Role::Model,
                parts: vec![Part::FunctionCall {
                    name: name.to_string(),
                    args,
                    thought_signature: None,
                }],
            },
            finish_reason: FinishReason::Stop,
        })
    }

    /// Queue a failure
    pub fn push_error(&self, error: LlmError) -> &Self {
        self.lock_script().push_back(Err(error));
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of generate calls received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<LlmResult<GenerateResponse>>> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        self.lock_script()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Network("script exhausted".to_string())))
    }
}
