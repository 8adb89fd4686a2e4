//! Core agent implementation
//!
//! - `StudentAgent`: per-conversation turn protocol with a single
//!   notes-retrieval round trip
//! - `StateToken`: versioned snapshot used to resume an agent

mod state;
mod student;

pub use state::{StateToken, STATE_VERSION};
pub use student::StudentAgent;
