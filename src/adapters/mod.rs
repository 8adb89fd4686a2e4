pub mod api_handler;
pub mod auth_middleware;
pub mod health_handler;
pub mod login_store;
pub mod notes_index;
pub mod session_manager;
