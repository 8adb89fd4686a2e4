//! In-memory credential store
//!
//! Passwords are kept as salted SHA-256 digests.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("An account with this email already exists.")]
    DuplicateAccount,
}

struct Account {
    user_id: String,
    salt: String,
    digest: String,
}

#[derive(Default)]
pub struct LoginStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl LoginStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new account and return its user id
    pub async fn add(&self, email: &str, password: &str) -> Result<String, LoginError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(LoginError::DuplicateAccount);
        }

        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            digest: digest(&salt, password),
            salt,
        };
        let user_id = account.user_id.clone();
        accounts.insert(email.to_string(), account);

        tracing::info!(user_id = %user_id, "Registered account");
        Ok(user_id)
    }

    /// User id for matching credentials
    pub async fn authenticate(&self, email: &str, password: &str) -> Option<String> {
        let accounts = self.accounts.read().await;
        accounts
            .get(email)
            .filter(|a| a.digest == digest(&a.salt, password))
            .map(|a| a.user_id.clone())
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_authenticate() {
        let store = LoginStore::new();
        let id = store.add("a@b.c", "hunter2").await.unwrap();

        assert_eq!(store.authenticate("a@b.c", "hunter2").await, Some(id));
        assert_eq!(store.authenticate("a@b.c", "wrong").await, None);
        assert_eq!(store.authenticate("x@y.z", "hunter2").await, None);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = LoginStore::new();
        store.add("a@b.c", "one").await.unwrap();
        assert_eq!(store.add("a@b.c", "two").await, Err(LoginError::DuplicateAccount));
    }

    #[tokio::test]
    async fn test_password_not_stored_in_plain_text() {
        let store = LoginStore::new();
        store.add("a@b.c", "hunter2").await.unwrap();

        let accounts = store.accounts.read().await;
        let account = &accounts["a@b.c"];
        assert_ne!(account.digest, "hunter2");
        assert_eq!(account.digest.len(), 64);
    }
}
