//! Generative model providers
//!
//! The agent talks to the model through [`LlmProvider`]. A request carries
//! the full transcript, the system instruction and the declared tools; a
//! response is one model content unit (text, function calls, thoughts).

mod gemini;
mod scripted;

pub use gemini::GeminiProvider;
pub use scripted::ScriptedProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::domain::{Content, ToolDefinition};
use crate::agents::error::LlmResult;

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Run one generation over the given transcript
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse>;
}

/// Request for one model generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier
    pub model: String,
    /// Fixed system instruction
    pub system_instruction: String,
    /// Full ordered transcript
    pub contents: Vec<Content>,
    /// Tools the model may call
    pub tools: Vec<ToolDefinition>,
    /// Ask the model to return reasoning-trace parts
    pub include_thoughts: bool,
}

/// Response from one model generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The model's content unit
    pub content: Content,
    /// Reason the generation stopped
    pub finish_reason: FinishReason,
}

/// Reason generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop
    #[default]
    Stop,
    /// Hit max tokens
    Length,
    /// Content filtered
    ContentFilter,
}
