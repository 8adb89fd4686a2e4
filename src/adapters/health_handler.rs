use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agents::memory::AgentCache;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_provider: String,
    pub live_agents: usize,
}

pub struct HealthHandler {
    provider: String,
    cache: Arc<AgentCache>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(provider: impl Into<String>, cache: Arc<AgentCache>) -> Self {
        Self {
            provider: provider.into(),
            cache,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            model_provider: self.provider.clone(),
            live_agents: self.cache.len().await,
        };

        (StatusCode::OK, Json(status))
    }

    /// Liveness check
    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "alive",
            "message": "Server is alive"
        })))
    }
}
