//! In-memory chat record store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChatRecord, ChatRecordStore};
use crate::agents::core::StateToken;
use crate::agents::domain::ChatMessage;
use crate::agents::error::{AgentError, AgentResult};

#[derive(Default)]
struct Inner {
    records: HashMap<String, ChatRecord>,
    by_owner: HashMap<String, Vec<String>>,
}

/// In-memory chat record store
#[derive(Default)]
pub struct InMemoryChatStore {
    inner: RwLock<Inner>,
}

impl InMemoryChatStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(chat_id: &str) -> AgentError {
    AgentError::ChatNotFound(chat_id.to_string())
}

#[async_trait]
impl ChatRecordStore for InMemoryChatStore {
    async fn create(&self, owner: &str) -> AgentResult<String> {
        let chat_id = Uuid::new_v4().to_string();
        let mut inner = self.inner.write().await;

        inner
            .records
            .insert(chat_id.clone(), ChatRecord::new(chat_id.clone(), owner));
        inner
            .by_owner
            .entry(owner.to_string())
            .or_default()
            .push(chat_id.clone());

        Ok(chat_id)
    }

    async fn load_conversation(&self, chat_id: &str) -> AgentResult<Vec<ChatMessage>> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(chat_id)
            .map(|r| r.conversation.clone())
            .ok_or_else(|| not_found(chat_id))
    }

    async fn store_conversation(
        &self,
        chat_id: &str,
        conversation: Vec<ChatMessage>,
    ) -> AgentResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner.records.get_mut(chat_id).ok_or_else(|| not_found(chat_id))?;
        record.conversation = conversation;
        Ok(())
    }

    async fn load_agent_state(&self, chat_id: &str) -> AgentResult<Option<StateToken>> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(chat_id)
            .map(|r| r.agent_state.clone())
            .ok_or_else(|| not_found(chat_id))
    }

    async fn store_agent_state(&self, chat_id: &str, state: StateToken) -> AgentResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner.records.get_mut(chat_id).ok_or_else(|| not_found(chat_id))?;
        record.agent_state = Some(state);
        Ok(())
    }

    async fn commit_turn(
        &self,
        chat_id: &str,
        messages: Vec<ChatMessage>,
        state: Option<StateToken>,
    ) -> AgentResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner.records.get_mut(chat_id).ok_or_else(|| not_found(chat_id))?;
        record.apply_turn(messages, state);
        Ok(())
    }

    async fn owned_by(&self, chat_id: &str, user_id: &str) -> AgentResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .get(chat_id)
            .map_or(false, |r| r.owner == user_id))
    }

    async fn conversations_for(&self, user_id: &str) -> AgentResult<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner.by_owner.get(user_id).cloned().unwrap_or_default())
    }
}
