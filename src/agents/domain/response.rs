//! Reply types: what a turn returns and how it is shown to the user

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool_call::{RetrieveNotesArgs, RETRIEVE_NOTES_TOOL};

/// Role in the user-facing message log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the user-facing message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The resolved retrieval round trip of a turn
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExchange {
    /// Arguments exactly as the model sent them
    pub args: Value,
    /// Validated form of `args`
    pub request: RetrieveNotesArgs,
    /// Payload returned by the resolver
    pub result: Value,
}

/// Outcome of one `generate` call
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    /// Final answer text
    pub text: String,
    /// Present when the retrieval tool was resolved during the turn
    pub tool_exchange: Option<ToolExchange>,
}

impl TurnReply {
    /// Timeline view: tool call, tool result, then the answer
    pub fn entries(&self) -> Vec<ReplyEntry> {
        let mut entries = Vec::with_capacity(3);

        if let Some(exchange) = &self.tool_exchange {
            entries.push(ReplyEntry::ToolCall {
                role: ChatRole::Assistant,
                tool_call: ToolCallView {
                    name: RETRIEVE_NOTES_TOOL.to_string(),
                    args: exchange.args.clone(),
                },
            });
            entries.push(ReplyEntry::ToolResult {
                role: ChatRole::User,
                tool_call_result: ToolResultView {
                    name: RETRIEVE_NOTES_TOOL.to_string(),
                    result: exchange.result.clone(),
                },
            });
        }

        entries.push(ReplyEntry::Content {
            role: ChatRole::Assistant,
            content: self.text.clone(),
        });

        entries
    }

    /// User-facing body: plain text, or the timeline when a tool was called
    pub fn body(&self) -> ReplyBody {
        if self.tool_exchange.is_some() {
            ReplyBody::Timeline(self.entries())
        } else {
            ReplyBody::Text(self.text.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallView {
    pub name: String,
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultView {
    pub name: String,
    pub result: Value,
}

/// One rendered step of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyEntry {
    ToolCall {
        role: ChatRole,
        #[serde(rename = "toolCall")]
        tool_call: ToolCallView,
    },
    ToolResult {
        role: ChatRole,
        #[serde(rename = "toolCallResult")]
        tool_call_result: ToolResultView,
    },
    Content {
        role: ChatRole,
        content: String,
    },
}

/// Reply shape returned over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Text(String),
    Timeline(Vec<ReplyEntry>),
}
