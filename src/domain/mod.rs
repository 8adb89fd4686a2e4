use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod auth;

/// Nearest-content matches, one inner list per query string, most relevant
/// first
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct NotesQueryResult {
    pub ids: Vec<Vec<String>>,
    pub documents: Vec<Vec<String>>,
}

/// Per-user notes collection searchable by similarity
#[async_trait]
pub trait NotesPort: Send + Sync {
    /// Add documents to the user's collection and return their ids
    async fn add(&self, user_id: &str, documents: Vec<String>) -> anyhow::Result<Vec<String>>;

    async fn query(
        &self,
        user_id: &str,
        query_texts: &[String],
        n_results: u32,
    ) -> anyhow::Result<NotesQueryResult>;
}
