//! Student agent system
//!
//! A conversational agent backed by a generative model that can look up the
//! user's notes through a single retrieval tool.
//!
//! ## Architecture
//!
//! - `domain/` - Transcript content, tool contract, reply shapes
//! - `llm/` - Model providers (Gemini, scripted)
//! - `core/` - `StudentAgent` and its state token
//! - `memory/` - Hot agent cache and durable chat record stores
//! - `handler` - Per-chat orchestration

pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod handler;
pub mod llm;
pub mod memory;

// Re-export commonly used types
pub use config::*;
pub use domain::*;
pub use error::*;
pub use handler::{ChatHandler, UserNotesResolver};
