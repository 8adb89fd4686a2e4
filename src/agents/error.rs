//! Error types for the student agent and its collaborators

use thiserror::Error;

/// Errors that can occur during agent and conversation operations
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model service or the notes service could not be reached or failed
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The model asked for the retrieval tool with arguments of the wrong shape
    #[error("Malformed tool call: {0}")]
    MalformedToolCall(String),

    /// A saved state token could not be parsed or validated
    #[error("Corrupt agent state: {0}")]
    CorruptState(String),

    /// The model asked for a tool call that this agent does not resolve
    #[error("Unresolved tool call: {0}")]
    UnresolvedToolCall(String),

    /// `save` was called on an agent built without persistence
    #[error("Agent is not persistable")]
    NotPersistable,

    /// Chat record not found
    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    /// Chat exists but belongs to someone else
    #[error("Chat {chat_id} does not belong to user {user_id}")]
    NotOwner { chat_id: String, user_id: String },

    /// Durable store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors specific to LLM provider operations
#[derive(Debug, Error)]
pub enum LlmError {
    /// API error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,

    /// The model declined to answer (safety or recitation filters)
    #[error("Response blocked: {0}")]
    Blocked(String),
}

impl LlmError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::RateLimited(_) | LlmError::Network(_) | LlmError::Timeout => true,
            LlmError::Authentication(_) | LlmError::Parse(_) | LlmError::Blocked(_) => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network(format!("Connection error: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for AgentError {
    fn from(err: LlmError) -> Self {
        AgentError::UpstreamUnavailable(format!("model service: {}", err))
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::Store(format!("IO error: {}", err))
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
