//! # Scholar - note-aware student chat assistant
//!
//! Scholar serves a conversational "student" agent backed by Gemini. The
//! agent can look up the signed-in user's own notes through a single
//! retrieval tool, and every chat can be resumed after a restart from its
//! saved state token.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scholar::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let settings = Settings::from_root(".")?;
//!
//!     println!("listening on {}:{}", settings.server.host, settings.server.port);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Agents**: student agent, model providers, agent cache and chat stores
//! - **Domain**: ports to outer collaborators (notes, auth context)
//! - **Adapters**: HTTP handlers, sessions, credentials, notes index
//! - **Config**: Configuration management

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::auth_middleware::{auth_middleware, AuthMiddleware, SharedAuthMiddleware};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::login_store::LoginStore;
use crate::adapters::notes_index::InMemoryNotesIndex;
use crate::adapters::session_manager::SessionManager;
use crate::agents::handler::ChatHandler;
use crate::agents::llm::LlmProvider;
use crate::agents::memory::{create_store, AgentCache};
use crate::config::Settings;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Wire up every service the router needs around the given model provider
pub fn build_state(
    settings: &Settings,
    llm: Arc<dyn LlmProvider>,
) -> anyhow::Result<(ApiState, Arc<HealthHandler>)> {
    let cache = Arc::new(AgentCache::new());
    let store = create_store(&settings.store)?;
    let notes = Arc::new(InMemoryNotesIndex::new());

    let health_handler = Arc::new(HealthHandler::new(llm.name(), cache.clone()));

    let chats = Arc::new(ChatHandler::new(
        llm,
        cache,
        store,
        notes.clone(),
        settings.agent.clone(),
        settings.notes.clone(),
    ));

    let state = ApiState {
        logins: Arc::new(LoginStore::new()),
        sessions: Arc::new(SessionManager::new()),
        notes,
        chats,
    };

    Ok((state, health_handler))
}

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `state` - Shared services for the REST handlers
/// * `health_handler` - Health check handler
/// * `cors_origins` - Origins allowed by CORS; `*` allows any
pub fn create_app(
    state: ApiState,
    health_handler: Arc<HealthHandler>,
    cors_origins: &[String],
) -> Router {
    // Public routes (no authentication required)
    let public_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/auth/new-account", post(api_handler::new_account))
        .route("/auth/new-session", post(api_handler::new_session))
        .with_state(state.clone());

    // Protected routes (session token required)
    let auth: SharedAuthMiddleware = Arc::new(AuthMiddleware::new(state.sessions.clone()));
    let protected_router = Router::new()
        .route("/auth/session-expire", post(api_handler::session_expire))
        .route("/notes/note-upload", post(api_handler::note_upload))
        .route("/chat/new-chat", post(api_handler::new_chat))
        .route("/chat/chats", get(api_handler::list_chats))
        .route("/chat/student-response", post(api_handler::student_response))
        .route("/chat/conversation/:chat_id", get(api_handler::get_conversation))
        .route_layer(axum::middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    public_router
        .merge(protected_router)
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
