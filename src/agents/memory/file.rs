//! File-based chat record store
//!
//! One pretty-printed JSON document per chat, `<base>/<chat_id>.json`.
//! Writes go to a temp file that is renamed over the target, so a record is
//! always either the old or the new version.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{ChatRecord, ChatRecordStore};
use crate::agents::core::StateToken;
use crate::agents::domain::ChatMessage;
use crate::agents::error::{AgentError, AgentResult};

/// File-based chat record store
pub struct FileChatStore {
    base_path: PathBuf,
    /// owner -> chat ids, oldest first
    by_owner: RwLock<HashMap<String, Vec<String>>>,
    /// Serializes read-modify-write cycles on record files
    write_lock: Mutex<()>,
}

impl FileChatStore {
    /// Open (or create) a store rooted at `base_path` and rebuild the owner
    /// index from the records found there
    pub fn new(base_path: impl AsRef<Path>) -> AgentResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        // Sync for constructor
        std::fs::create_dir_all(&base_path)
            .map_err(|e| AgentError::Store(format!("Failed to create directory: {}", e)))?;

        let by_owner = Self::scan(&base_path)?;

        Ok(Self {
            base_path,
            by_owner: RwLock::new(by_owner),
            write_lock: Mutex::new(()),
        })
    }

    fn scan(base_path: &Path) -> AgentResult<HashMap<String, Vec<String>>> {
        let mut records = Vec::new();

        let entries = std::fs::read_dir(base_path)
            .map_err(|e| AgentError::Store(format!("Failed to read directory: {}", e)))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|c| serde_json::from_str::<ChatRecord>(&c).map_err(|e| e.to_string()));

            match parsed {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable chat record: {}", e)
                }
            }
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut by_owner: HashMap<String, Vec<String>> = HashMap::new();
        for record in records {
            by_owner.entry(record.owner).or_default().push(record.chat_id);
        }

        Ok(by_owner)
    }

    /// Path for a chat id. Only the canonical lowercase hyphenated UUID form
    /// maps to a file, so each record has exactly one id string.
    fn record_path(&self, chat_id: &str) -> Option<PathBuf> {
        Uuid::parse_str(chat_id)
            .ok()
            .map(|id| id.hyphenated().to_string())
            .filter(|canonical| canonical == chat_id)
            .map(|canonical| self.base_path.join(format!("{}.json", canonical)))
    }

    async fn read(&self, chat_id: &str) -> AgentResult<Option<ChatRecord>> {
        let Some(path) = self.record_path(chat_id) else {
            return Ok(None);
        };

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AgentError::Store(format!(
                "Failed to read chat record file: {}",
                e
            ))),
        }
    }

    async fn read_existing(&self, chat_id: &str) -> AgentResult<ChatRecord> {
        self.read(chat_id)
            .await?
            .ok_or_else(|| AgentError::ChatNotFound(chat_id.to_string()))
    }

    async fn write(&self, record: &ChatRecord) -> AgentResult<()> {
        let path = self
            .record_path(&record.chat_id)
            .ok_or_else(|| AgentError::ChatNotFound(record.chat_id.clone()))?;
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(record)?;

        fs::write(&tmp, content)
            .await
            .map_err(|e| AgentError::Store(format!("Failed to write chat record file: {}", e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| AgentError::Store(format!("Failed to replace chat record file: {}", e)))?;

        Ok(())
    }

    async fn update<F>(&self, chat_id: &str, apply: F) -> AgentResult<()>
    where
        F: FnOnce(&mut ChatRecord) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut record = self.read_existing(chat_id).await?;
        apply(&mut record);
        self.write(&record).await
    }
}

#[async_trait]
impl ChatRecordStore for FileChatStore {
    async fn create(&self, owner: &str) -> AgentResult<String> {
        let record = ChatRecord::new(Uuid::new_v4().to_string(), owner);

        {
            let _guard = self.write_lock.lock().await;
            self.write(&record).await?;
        }

        self.by_owner
            .write()
            .await
            .entry(owner.to_string())
            .or_default()
            .push(record.chat_id.clone());

        tracing::debug!(chat_id = %record.chat_id, "Created chat record file");
        Ok(record.chat_id)
    }

    async fn load_conversation(&self, chat_id: &str) -> AgentResult<Vec<ChatMessage>> {
        Ok(self.read_existing(chat_id).await?.conversation)
    }

    async fn store_conversation(
        &self,
        chat_id: &str,
        conversation: Vec<ChatMessage>,
    ) -> AgentResult<()> {
        self.update(chat_id, move |r| r.conversation = conversation).await
    }

    async fn load_agent_state(&self, chat_id: &str) -> AgentResult<Option<StateToken>> {
        Ok(self.read_existing(chat_id).await?.agent_state)
    }

    async fn store_agent_state(&self, chat_id: &str, state: StateToken) -> AgentResult<()> {
        self.update(chat_id, move |r| r.agent_state = Some(state)).await
    }

    async fn commit_turn(
        &self,
        chat_id: &str,
        messages: Vec<ChatMessage>,
        state: Option<StateToken>,
    ) -> AgentResult<()> {
        self.update(chat_id, move |r| r.apply_turn(messages, state)).await
    }

    async fn owned_by(&self, chat_id: &str, user_id: &str) -> AgentResult<bool> {
        Ok(self
            .read(chat_id)
            .await?
            .map_or(false, |r| r.owner == user_id))
    }

    async fn conversations_for(&self, user_id: &str) -> AgentResult<Vec<String>> {
        Ok(self
            .by_owner
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}
