//! Configuration types for the student agent, its model client and its stores

use serde::{Deserialize, Serialize};

/// Default persona given to every fresh agent
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a very smart and knowledgable person who can tackle any question without much help.";

/// Gemini 2.5 Flash
pub const GEMINI_2_5_FLASH: &str = "gemini-2.5-flash";

/// Configuration for student agents created by the orchestrator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// System instruction for fresh agents
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
    /// Model identifier for fresh agents
    #[serde(default = "default_model")]
    pub model: String,
    /// Request and keep reasoning-trace parts
    #[serde(default = "default_true")]
    pub capture_reasoning: bool,
    /// Save agent state after every turn
    #[serde(default = "default_true")]
    pub persistable: bool,
    /// What to do when the model asks for a tool call that is not resolved
    #[serde(default)]
    pub unresolved_tool_call: UnresolvedToolCallPolicy,
    /// Replace an agent whose saved state is corrupt with a fresh one
    #[serde(default)]
    pub recover_corrupt_state: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_instruction: default_system_instruction(),
            model: default_model(),
            capture_reasoning: true,
            persistable: true,
            unresolved_tool_call: UnresolvedToolCallPolicy::default(),
            recover_corrupt_state: false,
        }
    }
}

fn default_system_instruction() -> String {
    DEFAULT_SYSTEM_INSTRUCTION.to_string()
}

fn default_model() -> String {
    GEMINI_2_5_FLASH.to_string()
}

fn default_true() -> bool {
    true
}

/// Policy for a tool call the agent will not resolve: a second request after
/// the retrieval round trip, or a request naming an unknown tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedToolCallPolicy {
    /// Return whatever text came with the call, possibly empty
    #[default]
    Answer,
    /// Fail the turn with `UnresolvedToolCall`
    Reject,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmProviderConfig {
    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Custom base URL (for proxies or test servers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Upper bound for retrying transient failures; 0 disables retries
    #[serde(default = "default_max_retry_elapsed")]
    pub max_retry_elapsed_seconds: u64,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            timeout_seconds: default_timeout(),
            max_retry_elapsed_seconds: default_max_retry_elapsed(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_retry_elapsed() -> u64 {
    30
}

/// Chat record store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Storage backend type
    #[serde(default)]
    pub backend: StoreBackend,
    /// Directory for file-based storage
    #[serde(default = "default_file_path")]
    pub file_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::InMemory,
            file_path: default_file_path(),
        }
    }
}

fn default_file_path() -> String {
    "data/chats".to_string()
}

/// Chat record storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Store in memory only (lost on restart)
    #[default]
    InMemory,
    /// One JSON file per chat
    File,
}

/// Notes retrieval configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotesConfig {
    /// Cap applied to the model's `n_results`
    #[serde(default = "default_max_results")]
    pub max_results_per_query: u32,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            max_results_per_query: default_max_results(),
        }
    }
}

fn default_max_results() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_config_defaults_from_empty_toml() {
        let config: AgentConfig = toml::from_str("").unwrap();
        assert_eq!(config.model, GEMINI_2_5_FLASH);
        assert_eq!(config.system_instruction, DEFAULT_SYSTEM_INSTRUCTION);
        assert!(config.capture_reasoning);
        assert!(config.persistable);
        assert_eq!(config.unresolved_tool_call, UnresolvedToolCallPolicy::Answer);
        assert!(!config.recover_corrupt_state);
    }

    #[test]
    fn test_policy_parses_snake_case() {
        let config: AgentConfig = toml::from_str("unresolved_tool_call = \"reject\"").unwrap();
        assert_eq!(config.unresolved_tool_call, UnresolvedToolCallPolicy::Reject);
    }

    #[test]
    fn test_store_backend_parses() {
        let config: StoreConfig = toml::from_str("backend = \"file\"\nfile_path = \"/tmp/x\"").unwrap();
        assert_eq!(config.backend, StoreBackend::File);
        assert_eq!(config.file_path, "/tmp/x");
    }
}
