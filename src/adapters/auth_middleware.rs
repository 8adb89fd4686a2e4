use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::adapters::session_manager::SessionManager;
use crate::domain::auth::AuthContext;

/// Resolves the `Authorization` header to a live session
pub struct AuthMiddleware {
    sessions: Arc<SessionManager>,
}

pub type SharedAuthMiddleware = Arc<AuthMiddleware>;

impl AuthMiddleware {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Accepts `Authorization: <token>` or `Authorization: Bearer <token>`
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let raw = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

        let user_id = self
            .sessions
            .authenticate(token)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(AuthContext {
            user_id,
            token: token.to_string(),
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    InvalidCredentials,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingCredentials => "Missing session token",
            AuthError::InvalidCredentials => "Invalid session token",
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": message }))).into_response()
    }
}

pub async fn auth_middleware(
    State(auth): State<SharedAuthMiddleware>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = auth.authenticate(request.headers()).await?;

    // Handlers read the caller from the request extensions
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    async fn middleware_with_session() -> (AuthMiddleware, String) {
        let sessions = Arc::new(SessionManager::new());
        let token = sessions.new_session("u1").await;
        (AuthMiddleware::new(sessions), token)
    }

    #[tokio::test]
    async fn test_raw_token_accepted() {
        let (auth, token) = middleware_with_session().await;
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&token).unwrap());

        let ctx = auth.authenticate(&headers).await.unwrap();
        assert_eq!(ctx.user_id, "u1");
        assert_eq!(ctx.token, token);
    }

    #[tokio::test]
    async fn test_bearer_token_accepted() {
        let (auth, token) = middleware_with_session().await;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        assert!(auth.authenticate(&headers).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_and_unknown_tokens() {
        let (auth, _) = middleware_with_session().await;
        assert!(matches!(
            auth.authenticate(&HeaderMap::new()).await,
            Err(AuthError::MissingCredentials)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("nope"));
        assert!(matches!(
            auth.authenticate(&headers).await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
