//! In-process notes index
//!
//! Per-user collections ranked by brute-force cosine similarity over
//! lower-cased term-frequency vectors.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{NotesPort, NotesQueryResult};

type TermVector = HashMap<String, f32>;

struct Note {
    id: String,
    document: String,
    terms: TermVector,
}

#[derive(Default)]
pub struct InMemoryNotesIndex {
    collections: RwLock<HashMap<String, Vec<Note>>>,
}

impl InMemoryNotesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn terms(text: &str) -> TermVector {
        let mut terms = TermVector::new();
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            *terms.entry(word.to_lowercase()).or_default() += 1.0;
        }
        terms
    }

    fn cosine_similarity(a: &TermVector, b: &TermVector) -> f32 {
        let dot_product: f32 = a
            .iter()
            .filter_map(|(term, x)| b.get(term).map(|y| x * y))
            .sum();
        let norm_a: f32 = a.values().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.values().map(|y| y * y).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl NotesPort for InMemoryNotesIndex {
    async fn add(&self, user_id: &str, documents: Vec<String>) -> anyhow::Result<Vec<String>> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(user_id.to_string()).or_default();

        let ids = documents
            .into_iter()
            .map(|document| {
                let id = Uuid::new_v4().to_string();
                collection.push(Note {
                    id: id.clone(),
                    terms: Self::terms(&document),
                    document,
                });
                id
            })
            .collect();

        Ok(ids)
    }

    async fn query(
        &self,
        user_id: &str,
        query_texts: &[String],
        n_results: u32,
    ) -> anyhow::Result<NotesQueryResult> {
        let collections = self.collections.read().await;
        let notes = collections.get(user_id).map(Vec::as_slice).unwrap_or_default();

        let mut result = NotesQueryResult::default();
        for query in query_texts {
            let query_terms = Self::terms(query);

            let mut scored: Vec<(f32, &Note)> = notes
                .iter()
                .map(|note| (Self::cosine_similarity(&query_terms, &note.terms), note))
                .collect();

            // Stable sort keeps insertion order among equal scores
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
            scored.truncate(n_results as usize);

            result
                .ids
                .push(scored.iter().map(|(_, n)| n.id.clone()).collect());
            result
                .documents
                .push(scored.iter().map(|(_, n)| n.document.clone()).collect());
        }

        Ok(result)
    }
}
