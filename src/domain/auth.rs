use serde::{Deserialize, Serialize};

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    /// Session token the request was authenticated with
    pub token: String,
}
