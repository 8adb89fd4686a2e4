//! Hot cache of live agents

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::agents::core::StudentAgent;

/// A live agent shared between the cache and the turn currently using it
pub type SharedAgent = Arc<Mutex<StudentAgent>>;

/// Process-wide map from chat id to live agent.
///
/// Unbounded and volatile. Losing an entry only costs a restore from the
/// durable store.
#[derive(Default)]
pub struct AgentCache {
    agents: RwLock<HashMap<String, SharedAgent>>,
}

impl AgentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the live agent for `chat_id`
    pub async fn store(&self, chat_id: &str, agent: SharedAgent) {
        self.agents.write().await.insert(chat_id.to_string(), agent);
    }

    pub async fn get(&self, chat_id: &str) -> Option<SharedAgent> {
        let agent = self.agents.read().await.get(chat_id).cloned();
        tracing::debug!(chat_id = %chat_id, hit = agent.is_some(), "Agent cache lookup");
        agent
    }

    /// Drop the live agent for `chat_id`, if any
    pub async fn evict(&self, chat_id: &str) -> Option<SharedAgent> {
        self.agents.write().await.remove(chat_id)
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
