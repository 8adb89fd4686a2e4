//! The student agent: one conversation's exchange with the model

use std::sync::Arc;

use serde_json::json;

use super::state::{AgentSnapshot, StateToken, STATE_VERSION};
use crate::agents::config::UnresolvedToolCallPolicy;
use crate::agents::domain::{
    Content, Part, RetrieveNotesArgs, ToolDefinition, ToolExchange, ToolResolver, TurnReply,
    RETRIEVE_NOTES_TOOL,
};
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::llm::{FinishReason, GenerateRequest, GenerateResponse, LlmProvider};

/// Conversational agent that can look up the user's notes.
///
/// Holds an append-only transcript. Each [`generate`](Self::generate) call
/// either extends it by a full turn (2 or 4 entries) or fails and leaves it
/// exactly as it was.
pub struct StudentAgent {
    llm: Arc<dyn LlmProvider>,
    model_id: String,
    system_instruction: String,
    capture_reasoning: bool,
    persistable: bool,
    unresolved_tool_call: UnresolvedToolCallPolicy,
    transcript: Vec<Content>,
}

impl StudentAgent {
    /// Create an agent with an empty transcript
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        system_instruction: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            model_id: model_id.into(),
            system_instruction: system_instruction.into(),
            capture_reasoning: true,
            persistable: true,
            unresolved_tool_call: UnresolvedToolCallPolicy::default(),
            transcript: Vec::new(),
        }
    }

    /// Rebuild an agent from a token produced by [`save`](Self::save)
    pub fn restore(llm: Arc<dyn LlmProvider>, token: &StateToken) -> AgentResult<Self> {
        let snapshot = token.decode()?;

        Ok(Self {
            llm,
            model_id: snapshot.model_id,
            system_instruction: snapshot.system_instruction,
            capture_reasoning: snapshot.capture_reasoning,
            persistable: true,
            unresolved_tool_call: UnresolvedToolCallPolicy::default(),
            transcript: snapshot.transcript,
        })
    }

    pub fn with_capture_reasoning(mut self, capture_reasoning: bool) -> Self {
        self.capture_reasoning = capture_reasoning;
        self
    }

    pub fn with_persistable(mut self, persistable: bool) -> Self {
        self.persistable = persistable;
        self
    }

    pub fn with_unresolved_tool_call(mut self, policy: UnresolvedToolCallPolicy) -> Self {
        self.unresolved_tool_call = policy;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn transcript(&self) -> &[Content] {
        &self.transcript
    }

    pub fn is_persistable(&self) -> bool {
        self.persistable
    }

    /// Serialize model id, system instruction and the full transcript
    pub fn save(&self) -> AgentResult<StateToken> {
        if !self.persistable {
            return Err(AgentError::NotPersistable);
        }

        StateToken::encode(&AgentSnapshot {
            version: STATE_VERSION,
            model_id: self.model_id.clone(),
            system_instruction: self.system_instruction.clone(),
            capture_reasoning: self.capture_reasoning,
            transcript: self.transcript.clone(),
        })
    }

    /// Run one user turn.
    ///
    /// At most one retrieval round trip is resolved; a tool request in the
    /// follow-up response is handled by the unresolved tool call policy.
    pub async fn generate(
        &mut self,
        prompt: &str,
        resolver: &dyn ToolResolver,
    ) -> AgentResult<TurnReply> {
        let mut staged = vec![Content::user_text(prompt)];

        tracing::debug!(model = %self.model_id, history = self.transcript.len(), "Invoking model");
        let first = self.invoke(&staged).await?.content;

        let requested = first
            .first_function_call()
            .map(|call| (call.name.to_string(), call.args.clone()));

        let mut tool_exchange = None;
        let final_content = match requested {
            Some((name, args)) if name == RETRIEVE_NOTES_TOOL => {
                let request = RetrieveNotesArgs::from_arguments(&args)?;
                let result = resolver.retrieve_notes(&request).await?;

                tracing::info!(
                    queries = request.query_texts.len(),
                    n_results = request.n_results,
                    "Resolved notes retrieval"
                );

                staged.push(self.recorded(first));
                staged.push(Content::function_response(
                    RETRIEVE_NOTES_TOOL,
                    json!({ "result": result.clone() }),
                ));

                let second = self.invoke(&staged).await?.content;
                tool_exchange = Some(ToolExchange {
                    args,
                    request,
                    result,
                });

                match second.first_function_call().map(|c| c.name.to_string()) {
                    Some(name) => self.unresolved(&name, second)?,
                    None => second,
                }
            }
            Some((name, _)) => self.unresolved(&name, first)?,
            None => first,
        };

        let text = final_content.text();
        staged.push(self.recorded(final_content));

        self.transcript.extend(staged);
        tracing::debug!(transcript = self.transcript.len(), "Turn appended");

        Ok(TurnReply {
            text,
            tool_exchange,
        })
    }

    async fn invoke(&self, staged: &[Content]) -> AgentResult<GenerateResponse> {
        let request = GenerateRequest {
            model: self.model_id.clone(),
            system_instruction: self.system_instruction.clone(),
            contents: self.transcript.iter().chain(staged).cloned().collect(),
            tools: vec![ToolDefinition::retrieve_notes()],
            include_thoughts: self.capture_reasoning,
        };

        let response = self.llm.generate(request).await?;

        match response.finish_reason {
            FinishReason::ContentFilter => {
                return Err(AgentError::UpstreamUnavailable(
                    "model response was blocked by content filtering".to_string(),
                ));
            }
            FinishReason::Length => {
                tracing::warn!(model = %self.model_id, "Model output truncated");
            }
            FinishReason::Stop => {}
        }

        // Never stage a model turn that would replay as empty
        if response.content.parts.iter().all(Part::is_thought) {
            return Err(AgentError::UpstreamUnavailable(
                "model returned no content".to_string(),
            ));
        }

        Ok(response)
    }

    fn unresolved(&self, name: &str, content: Content) -> AgentResult<Content> {
        match self.unresolved_tool_call {
            UnresolvedToolCallPolicy::Reject => {
                Err(AgentError::UnresolvedToolCall(name.to_string()))
            }
            UnresolvedToolCallPolicy::Answer => {
                tracing::warn!(tool = %name, "Leaving tool call unresolved, answering with text");
                Ok(content)
            }
        }
    }

    fn recorded(&self, content: Content) -> Content {
        if self.capture_reasoning {
            content
        } else {
            content.without_thoughts()
        }
    }
}

impl std::fmt::Debug for StudentAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentAgent")
            .field("llm", &self.llm.name())
            .field("model_id", &self.model_id)
            .field("capture_reasoning", &self.capture_reasoning)
            .field("persistable", &self.persistable)
            .field("transcript_len", &self.transcript.len())
            .finish()
    }
}
