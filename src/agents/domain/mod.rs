//! Domain types for the student agent
//!
//! Transcript content, the retrieval tool contract, and reply shapes.

mod content;
mod response;
mod tool_call;

pub use content::*;
pub use response::*;
pub use tool_call::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::agents::error::AgentResult;

/// Capability supplied by the caller to execute the retrieval tool.
///
/// The agent never builds one itself; it only knows that a resolver takes
/// validated arguments and returns a JSON-serializable payload.
#[async_trait]
pub trait ToolResolver: Send + Sync {
    async fn retrieve_notes(&self, args: &RetrieveNotesArgs) -> AgentResult<Value>;
}
