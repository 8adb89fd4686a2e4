//! Chat handler: resolves the live agent for a chat and runs turns

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::agents::config::{AgentConfig, NotesConfig};
use crate::agents::core::StudentAgent;
use crate::agents::domain::{ChatMessage, RetrieveNotesArgs, ToolResolver, TurnReply};
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::llm::LlmProvider;
use crate::agents::memory::{AgentCache, ChatRecordStore, SharedAgent};
use crate::domain::NotesPort;

/// Orchestrates chats for authenticated users
pub struct ChatHandler {
    llm: Arc<dyn LlmProvider>,
    cache: Arc<AgentCache>,
    store: Arc<dyn ChatRecordStore>,
    notes: Arc<dyn NotesPort>,
    config: AgentConfig,
    notes_config: NotesConfig,
}

impl ChatHandler {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        cache: Arc<AgentCache>,
        store: Arc<dyn ChatRecordStore>,
        notes: Arc<dyn NotesPort>,
        config: AgentConfig,
        notes_config: NotesConfig,
    ) -> Self {
        Self {
            llm,
            cache,
            store,
            notes,
            config,
            notes_config,
        }
    }

    /// Start a new, empty chat owned by `user_id`
    pub async fn new_chat(&self, user_id: &str) -> AgentResult<String> {
        let chat_id = self.store.create(user_id).await?;
        tracing::info!(chat_id = %chat_id, "Created chat");
        Ok(chat_id)
    }

    /// Chats owned by `user_id`, oldest first
    pub async fn chats(&self, user_id: &str) -> AgentResult<Vec<String>> {
        self.store.conversations_for(user_id).await
    }

    /// User-facing message log of a chat
    pub async fn conversation(&self, user_id: &str, chat_id: &str) -> AgentResult<Vec<ChatMessage>> {
        self.ensure_owner(user_id, chat_id).await?;
        self.store.load_conversation(chat_id).await
    }

    /// Run one turn of `chat_id` and persist it
    pub async fn respond(&self, user_id: &str, chat_id: &str, prompt: &str) -> AgentResult<TurnReply> {
        self.ensure_owner(user_id, chat_id).await?;

        let agent = self.resolve_agent(chat_id).await?;
        let resolver = UserNotesResolver::new(
            self.notes.clone(),
            user_id,
            self.notes_config.max_results_per_query,
        );

        let (reply, state) = {
            let mut agent = agent.lock().await;
            let reply = agent.generate(prompt, &resolver).await?;
            let state = if agent.is_persistable() {
                Some(agent.save()?)
            } else {
                None
            };
            (reply, state)
        };

        let messages = vec![
            ChatMessage::user(prompt),
            ChatMessage::assistant(reply.text.clone()),
        ];

        if let Err(e) = self.store.commit_turn(chat_id, messages, state).await {
            // The live agent is now ahead of the durable record
            self.cache.evict(chat_id).await;
            return Err(e);
        }

        self.cache.store(chat_id, agent).await;
        tracing::info!(
            chat_id = %chat_id,
            tool_called = reply.tool_exchange.is_some(),
            "Turn completed"
        );

        Ok(reply)
    }

    async fn ensure_owner(&self, user_id: &str, chat_id: &str) -> AgentResult<()> {
        if self.store.owned_by(chat_id, user_id).await? {
            Ok(())
        } else {
            Err(AgentError::NotOwner {
                chat_id: chat_id.to_string(),
                user_id: user_id.to_string(),
            })
        }
    }

    /// Hot cache, then saved state, then a fresh agent
    async fn resolve_agent(&self, chat_id: &str) -> AgentResult<SharedAgent> {
        if let Some(agent) = self.cache.get(chat_id).await {
            return Ok(agent);
        }

        let agent = match self.store.load_agent_state(chat_id).await? {
            Some(token) => match StudentAgent::restore(self.llm.clone(), &token) {
                Ok(agent) => agent
                    .with_persistable(self.config.persistable)
                    .with_unresolved_tool_call(self.config.unresolved_tool_call),
                Err(AgentError::CorruptState(reason)) if self.config.recover_corrupt_state => {
                    tracing::warn!(chat_id = %chat_id, "Discarding corrupt agent state: {}", reason);
                    self.fresh_agent()
                }
                Err(e) => return Err(e),
            },
            None => self.fresh_agent(),
        };

        tracing::debug!(chat_id = %chat_id, transcript = agent.transcript().len(), "Agent resolved");
        Ok(Arc::new(Mutex::new(agent)))
    }

    fn fresh_agent(&self) -> StudentAgent {
        StudentAgent::new(
            self.llm.clone(),
            self.config.system_instruction.clone(),
            self.config.model.clone(),
        )
        .with_capture_reasoning(self.config.capture_reasoning)
        .with_persistable(self.config.persistable)
        .with_unresolved_tool_call(self.config.unresolved_tool_call)
    }
}

/// Resolves the retrieval tool against one user's notes
pub struct UserNotesResolver {
    notes: Arc<dyn NotesPort>,
    user_id: String,
    max_results: u32,
}

impl UserNotesResolver {
    pub fn new(notes: Arc<dyn NotesPort>, user_id: impl Into<String>, max_results: u32) -> Self {
        Self {
            notes,
            user_id: user_id.into(),
            max_results,
        }
    }
}

#[async_trait]
impl ToolResolver for UserNotesResolver {
    async fn retrieve_notes(&self, args: &RetrieveNotesArgs) -> AgentResult<Value> {
        let n_results = args.n_results.min(self.max_results);

        let result = self
            .notes
            .query(&self.user_id, &args.query_texts, n_results)
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("notes service: {}", e)))?;

        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notes_index::InMemoryNotesIndex;
    use crate::agents::core::StateToken;
    use crate::agents::domain::RETRIEVE_NOTES_TOOL;
    use crate::agents::llm::ScriptedProvider;
    use crate::agents::memory::InMemoryChatStore;
    use serde_json::json;

    struct Fixture {
        llm: Arc<ScriptedProvider>,
        cache: Arc<AgentCache>,
        store: Arc<InMemoryChatStore>,
        handler: ChatHandler,
    }

    fn fixture(config: AgentConfig) -> Fixture {
        let llm = Arc::new(ScriptedProvider::new());
        let cache = Arc::new(AgentCache::new());
        let store = Arc::new(InMemoryChatStore::new());
        let handler = ChatHandler::new(
            llm.clone(),
            cache.clone(),
            store.clone(),
            Arc::new(InMemoryNotesIndex::new()),
            config,
            NotesConfig::default(),
        );
        Fixture {
            llm,
            cache,
            store,
            handler,
        }
    }

    #[tokio::test]
    async fn test_respond_commits_log_and_state() {
        let f = fixture(AgentConfig::default());
        f.llm.push_text("4");
        let chat = f.handler.new_chat("u").await.unwrap();

        let reply = f.handler.respond("u", &chat, "What is 2+2?").await.unwrap();

        assert_eq!(reply.text, "4");
        assert_eq!(
            f.handler.conversation("u", &chat).await.unwrap(),
            vec![ChatMessage::user("What is 2+2?"), ChatMessage::assistant("4")]
        );
        assert!(f.store.load_agent_state(&chat).await.unwrap().is_some());
        assert!(f.cache.get(&chat).await.is_some());
    }

    #[tokio::test]
    async fn test_other_user_is_rejected() {
        let f = fixture(AgentConfig::default());
        let chat = f.handler.new_chat("alice").await.unwrap();

        let err = f.handler.respond("bob", &chat, "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::NotOwner { .. }));
        assert_eq!(f.llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_resume_from_store_after_cache_loss() {
        let f = fixture(AgentConfig::default());
        f.llm.push_text("first").push_text("second");
        let chat = f.handler.new_chat("u").await.unwrap();
        f.handler.respond("u", &chat, "one").await.unwrap();

        f.cache.evict(&chat).await;
        f.handler.respond("u", &chat, "two").await.unwrap();

        // Second call sees the restored history plus the new prompt
        assert_eq!(f.llm.requests()[1].contents.len(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_state_fails_by_default() {
        let f = fixture(AgentConfig::default());
        let chat = f.handler.new_chat("u").await.unwrap();
        f.store
            .store_agent_state(&chat, StateToken::from_raw("garbage"))
            .await
            .unwrap();

        let err = f.handler.respond("u", &chat, "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::CorruptState(_)));
    }

    #[tokio::test]
    async fn test_corrupt_state_recovers_when_configured() {
        let f = fixture(AgentConfig {
            recover_corrupt_state: true,
            ..AgentConfig::default()
        });
        f.llm.push_text("fresh");
        let chat = f.handler.new_chat("u").await.unwrap();
        f.store
            .store_agent_state(&chat, StateToken::from_raw("garbage"))
            .await
            .unwrap();

        let reply = f.handler.respond("u", &chat, "hi").await.unwrap();
        assert_eq!(reply.text, "fresh");
    }

    #[tokio::test]
    async fn test_non_persistable_skips_state() {
        let f = fixture(AgentConfig {
            persistable: false,
            ..AgentConfig::default()
        });
        f.llm.push_text("ok");
        let chat = f.handler.new_chat("u").await.unwrap();

        f.handler.respond("u", &chat, "hi").await.unwrap();
        assert!(f.store.load_agent_state(&chat).await.unwrap().is_none());
        assert_eq!(f.store.load_conversation(&chat).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_turn_commits_nothing() {
        let f = fixture(AgentConfig::default());
        f.llm.push_function_call(RETRIEVE_NOTES_TOOL, json!({"query_texts": ["x"]}));
        let chat = f.handler.new_chat("u").await.unwrap();

        let err = f.handler.respond("u", &chat, "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::MalformedToolCall(_)));
        assert!(f.store.load_conversation(&chat).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolver_clamps_n_results() {
        let notes = Arc::new(InMemoryNotesIndex::new());
        notes
            .add("u", vec!["a".into(), "a b".into(), "a b c".into()])
            .await
            .unwrap();
        let resolver = UserNotesResolver::new(notes, "u", 2);

        let result = resolver
            .retrieve_notes(&RetrieveNotesArgs {
                query_texts: vec!["a".to_string()],
                n_results: 50,
            })
            .await
            .unwrap();
        assert_eq!(result["ids"][0].as_array().unwrap().len(), 2);
    }
}
