//! Storage for live agents and chat records
//!
//! Two tiers:
//! - [`AgentCache`]: volatile map of live agents, purely a latency optimization
//! - [`ChatRecordStore`]: durable chat records (owner, message log, last
//!   saved agent state)
//!
//! Record store backends:
//! - In-memory (default, lost on restart)
//! - File-based (one JSON document per chat)

mod cache;
mod file;
mod in_memory;

pub use cache::{AgentCache, SharedAgent};
pub use file::FileChatStore;
pub use in_memory::InMemoryChatStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agents::config::{StoreBackend, StoreConfig};
use crate::agents::core::StateToken;
use crate::agents::domain::ChatMessage;
use crate::agents::error::AgentResult;

/// Durable per-conversation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub chat_id: String,
    /// Immutable after creation
    pub owner: String,
    /// User-facing message log
    #[serde(default)]
    pub conversation: Vec<ChatMessage>,
    /// Last saved agent state, absent until a persisted turn completes
    #[serde(default)]
    pub agent_state: Option<StateToken>,
    pub created_at: DateTime<Utc>,
}

impl ChatRecord {
    pub fn new(chat_id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            owner: owner.into(),
            conversation: Vec::new(),
            agent_state: None,
            created_at: Utc::now(),
        }
    }

    /// Apply one completed turn: append to the log and replace the state
    pub fn apply_turn(&mut self, messages: Vec<ChatMessage>, state: Option<StateToken>) {
        self.conversation.extend(messages);
        if let Some(state) = state {
            self.agent_state = Some(state);
        }
    }
}

/// Trait for durable chat record backends.
///
/// Every operation on an unknown chat id fails with `ChatNotFound`, except
/// [`owned_by`](Self::owned_by) which answers `false`.
#[async_trait]
pub trait ChatRecordStore: Send + Sync {
    /// Allocate a new, empty chat for `owner` and return its id
    async fn create(&self, owner: &str) -> AgentResult<String>;

    /// Read the user-facing message log
    async fn load_conversation(&self, chat_id: &str) -> AgentResult<Vec<ChatMessage>>;

    /// Replace the user-facing message log
    async fn store_conversation(
        &self,
        chat_id: &str,
        conversation: Vec<ChatMessage>,
    ) -> AgentResult<()>;

    /// Read the last saved agent state
    async fn load_agent_state(&self, chat_id: &str) -> AgentResult<Option<StateToken>>;

    /// Replace the saved agent state
    async fn store_agent_state(&self, chat_id: &str, state: StateToken) -> AgentResult<()>;

    /// Append `messages` to the log and, when given, replace the saved
    /// state, as one atomic write
    async fn commit_turn(
        &self,
        chat_id: &str,
        messages: Vec<ChatMessage>,
        state: Option<StateToken>,
    ) -> AgentResult<()>;

    /// Whether `user_id` created `chat_id`
    async fn owned_by(&self, chat_id: &str, user_id: &str) -> AgentResult<bool>;

    /// Chats created by `user_id`, oldest first. Returns an owned copy.
    async fn conversations_for(&self, user_id: &str) -> AgentResult<Vec<String>>;
}

/// Create a chat record store from configuration
pub fn create_store(config: &StoreConfig) -> AgentResult<Arc<dyn ChatRecordStore>> {
    match config.backend {
        StoreBackend::InMemory => Ok(Arc::new(InMemoryChatStore::new())),
        StoreBackend::File => Ok(Arc::new(FileChatStore::new(&config.file_path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_turn_keeps_state_when_absent() {
        let mut record = ChatRecord::new("c1", "u1");
        record.apply_turn(vec![ChatMessage::user("hi")], Some(StateToken::from_raw("s1")));
        record.apply_turn(vec![ChatMessage::assistant("yo")], None);

        assert_eq!(record.conversation.len(), 2);
        assert_eq!(record.agent_state, Some(StateToken::from_raw("s1")));
    }

    #[test]
    fn test_create_store_in_memory() {
        assert!(create_store(&StoreConfig::default()).is_ok());
    }
}
