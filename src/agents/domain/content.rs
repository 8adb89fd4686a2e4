//! Transcript content types
//!
//! A transcript is an ordered list of [`Content`] units. Each unit carries a
//! [`Role`] and an ordered list of [`Part`]s. The transcript is the model's
//! working context, so its order is part of its meaning.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Originator of a content unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human, or a tool result being fed back to the model
    User,
    /// The generative model
    Model,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

/// A single fragment of a content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// Plain text
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought_signature: Option<String>,
    },
    /// Reasoning trace; replayed to the model, never shown as a reply
    Thought {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought_signature: Option<String>,
    },
    /// Tool invocation request emitted by the model
    FunctionCall {
        name: String,
        #[serde(default)]
        args: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought_signature: Option<String>,
    },
    /// Tool invocation result fed back to the model
    FunctionResponse { name: String, response: Value },
}

impl Part {
    /// Plain text part
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            thought_signature: None,
        }
    }

    /// Whether this part is a reasoning trace
    pub fn is_thought(&self) -> bool {
        matches!(self, Part::Thought { .. })
    }
}

/// Borrowed view of a function call part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionCallRef<'a> {
    pub name: &'a str,
    pub args: &'a Value,
}

/// A role-tagged content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// User turn holding a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Model turn holding a single text part
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// User turn wrapping a tool result, keyed by the tool's name
    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::FunctionResponse {
                name: name.into(),
                response,
            }],
        }
    }

    /// Concatenated non-thought text, the way a reply is shown to the user
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Function calls in part order
    pub fn function_calls(&self) -> impl Iterator<Item = FunctionCallRef<'_>> {
        self.parts.iter().filter_map(|p| match p {
            Part::FunctionCall { name, args, .. } => Some(FunctionCallRef { name, args }),
            _ => None,
        })
    }

    /// First function call, if any
    pub fn first_function_call(&self) -> Option<FunctionCallRef<'_>> {
        self.function_calls().next()
    }

    /// Copy of this content without reasoning-trace parts
    pub fn without_thoughts(&self) -> Self {
        Self {
            role: self.role,
            parts: self.parts.iter().filter(|p| !p.is_thought()).cloned().collect(),
        }
    }
}
