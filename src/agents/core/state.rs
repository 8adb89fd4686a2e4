//! Versioned state token for saving and restoring a student agent

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agents::domain::Content;
use crate::agents::error::{AgentError, AgentResult};

/// Current state token schema version
pub const STATE_VERSION: u32 = 1;

/// Opaque serialized snapshot of an agent.
///
/// The inner text is a self-describing JSON document. Callers should treat it
/// as a blob: store it, hand it back to [`StudentAgent::restore`](super::StudentAgent::restore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateToken(String);

impl StateToken {
    /// Wrap raw token text, e.g. read back from a store
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub(crate) fn encode(snapshot: &AgentSnapshot) -> AgentResult<Self> {
        Ok(Self(serde_json::to_string(snapshot)?))
    }

    /// Parse and validate the token.
    ///
    /// Unknown fields are ignored; a missing required field, invalid JSON or
    /// an unrecognized version fails with `CorruptState`.
    pub(crate) fn decode(&self) -> AgentResult<AgentSnapshot> {
        let raw: Value = serde_json::from_str(&self.0)
            .map_err(|e| AgentError::CorruptState(format!("invalid JSON: {}", e)))?;

        let version = raw
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| AgentError::CorruptState("missing schema version".to_string()))?;

        if version != u64::from(STATE_VERSION) {
            return Err(AgentError::CorruptState(format!(
                "unsupported schema version {}",
                version
            )));
        }

        serde_json::from_value(raw).map_err(|e| AgentError::CorruptState(e.to_string()))
    }
}

impl std::fmt::Display for StateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded token contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AgentSnapshot {
    pub version: u32,
    pub model_id: String,
    pub system_instruction: String,
    #[serde(default = "default_capture_reasoning")]
    pub capture_reasoning: bool,
    pub transcript: Vec<Content>,
}

fn default_capture_reasoning() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> AgentSnapshot {
        AgentSnapshot {
            version: STATE_VERSION,
            model_id: "gemini-2.5-flash".to_string(),
            system_instruction: "Be a student".to_string(),
            capture_reasoning: true,
            transcript: vec![Content::user_text("hi"), Content::model_text("hello")],
        }
    }

    #[test]
    fn test_encode_decode() {
        let token = StateToken::encode(&snapshot()).unwrap();
        assert_eq!(token.decode().unwrap(), snapshot());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut value = serde_json::to_value(snapshot()).unwrap();
        value["added_later"] = json!({"anything": 1});
        let token = StateToken::from_raw(value.to_string());
        assert_eq!(token.decode().unwrap(), snapshot());
    }

    #[test]
    fn test_missing_required_field_fails_closed() {
        let mut value = serde_json::to_value(snapshot()).unwrap();
        value.as_object_mut().unwrap().remove("system_instruction");
        let token = StateToken::from_raw(value.to_string());
        assert!(matches!(token.decode(), Err(AgentError::CorruptState(_))));
    }

    #[test]
    fn test_unknown_version_fails() {
        let mut value = serde_json::to_value(snapshot()).unwrap();
        value["version"] = json!(99);
        let token = StateToken::from_raw(value.to_string());
        assert!(matches!(token.decode(), Err(AgentError::CorruptState(_))));
    }

    #[test]
    fn test_garbage_fails() {
        let token = StateToken::from_raw("not json at all");
        assert!(matches!(token.decode(), Err(AgentError::CorruptState(_))));
    }
}
