//! Session token manager
//!
//! Issues opaque UUID tokens bound to a user id. Tokens live until they are
//! expired explicitly or the process restarts.

use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown session token")]
    UnknownSession,
}

#[derive(Default)]
pub struct SessionManager {
    /// token -> user id
    sessions: RwLock<HashMap<String, String>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `user_id` and return its token
    pub async fn new_session(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), user_id.to_string());
        info!(user_id = %user_id, "Created session");
        token
    }

    /// User id bound to `token`, if the session is live
    pub async fn authenticate(&self, token: &str) -> Option<String> {
        self.sessions.read().await.get(token).cloned()
    }

    /// End the session for `token`
    pub async fn expire(&self, token: &str) -> Result<(), SessionError> {
        match self.sessions.write().await.remove(token) {
            Some(user_id) => {
                debug!(user_id = %user_id, "Session expired");
                Ok(())
            }
            None => Err(SessionError::UnknownSession),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let sessions = SessionManager::new();
        let token = sessions.new_session("u1").await;

        assert_eq!(sessions.authenticate(&token).await.as_deref(), Some("u1"));
        sessions.expire(&token).await.unwrap();
        assert!(sessions.authenticate(&token).await.is_none());
        assert_eq!(sessions.expire(&token).await, Err(SessionError::UnknownSession));
    }

    #[tokio::test]
    async fn test_tokens_are_distinct() {
        let sessions = SessionManager::new();
        let a = sessions.new_session("u1").await;
        let b = sessions.new_session("u1").await;
        assert_ne!(a, b);
    }
}
