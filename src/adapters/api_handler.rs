//! REST API handlers for accounts, notes and chats

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::adapters::login_store::{LoginError, LoginStore};
use crate::adapters::session_manager::SessionManager;
use crate::agents::domain::{ChatMessage, ReplyBody};
use crate::agents::error::AgentError;
use crate::agents::handler::ChatHandler;
use crate::domain::auth::AuthContext;
use crate::domain::NotesPort;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub logins: Arc<LoginStore>,
    pub sessions: Arc<SessionManager>,
    pub notes: Arc<dyn NotesPort>,
    pub chats: Arc<ChatHandler>,
}

// ============================================================================
// Errors
// ============================================================================

/// Error rendered as `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        let status = match &err {
            AgentError::NotOwner { .. } => {
                return ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "Chat ID does not belong to this user ID.",
                )
            }
            AgentError::ChatNotFound(_) => StatusCode::NOT_FOUND,
            AgentError::UpstreamUnavailable(_)
            | AgentError::MalformedToolCall(_)
            | AgentError::UnresolvedToolCall(_) => StatusCode::BAD_GATEWAY,
            AgentError::CorruptState(_)
            | AgentError::NotPersistable
            | AgentError::Store(_)
            | AgentError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(status = %status, "Request failed: {}", err);
        ApiError::new(status, err.to_string())
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUploadResponse {
    pub note_id: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatResponse {
    pub chat_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatsResponse {
    pub chat_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRequest {
    pub chat_id: String,
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentResponse {
    pub response: ReplyBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub conversation: Vec<ChatMessage>,
}

// ============================================================================
// Auth
// ============================================================================

pub async fn new_account(
    State(state): State<ApiState>,
    Json(creds): Json<Credentials>,
) -> ApiResult<Json<SessionResponse>> {
    let user_id = state
        .logins
        .add(&creds.email, &creds.password)
        .await
        .map_err(|e| match e {
            LoginError::DuplicateAccount => ApiError::new(StatusCode::CONFLICT, e.to_string()),
        })?;

    let session_token = state.sessions.new_session(&user_id).await;
    Ok(Json(SessionResponse { session_token }))
}

pub async fn new_session(
    State(state): State<ApiState>,
    Json(creds): Json<Credentials>,
) -> ApiResult<Json<SessionResponse>> {
    let user_id = state
        .logins
        .authenticate(&creds.email, &creds.password)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Incorrect email or password."))?;

    let session_token = state.sessions.new_session(&user_id).await;
    Ok(Json(SessionResponse { session_token }))
}

pub async fn session_expire(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<impl IntoResponse> {
    state
        .sessions
        .expire(&auth.token)
        .await
        .map_err(|e| ApiError::new(StatusCode::UNAUTHORIZED, e.to_string()))?;

    Ok((StatusCode::OK, Json(json!({ "status": "expired" }))))
}

// ============================================================================
// Notes
// ============================================================================

pub async fn note_upload(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthContext>,
    body: Bytes,
) -> ApiResult<Json<NoteUploadResponse>> {
    let text = String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Note must be UTF-8 text."))?;

    let note_id = state
        .notes
        .add(&auth.user_id, vec![text])
        .await
        .map_err(|e| {
            tracing::error!("Failed to store note: {}", e);
            ApiError::new(StatusCode::BAD_GATEWAY, format!("notes service: {}", e))
        })?;

    Ok(Json(NoteUploadResponse { note_id }))
}

// ============================================================================
// Chats
// ============================================================================

pub async fn new_chat(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<NewChatResponse>> {
    let chat_id = state.chats.new_chat(&auth.user_id).await?;
    Ok(Json(NewChatResponse { chat_id }))
}

pub async fn list_chats(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ChatsResponse>> {
    let chat_ids = state.chats.chats(&auth.user_id).await?;
    Ok(Json(ChatsResponse { chat_ids }))
}

pub async fn student_response(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<StudentRequest>,
) -> ApiResult<Json<StudentResponse>> {
    let reply = state
        .chats
        .respond(&auth.user_id, &request.chat_id, &request.prompt)
        .await?;

    Ok(Json(StudentResponse {
        response: reply.body(),
    }))
}

pub async fn get_conversation(
    State(state): State<ApiState>,
    Extension(auth): Extension<AuthContext>,
    Path(chat_id): Path<String>,
) -> ApiResult<Json<ConversationResponse>> {
    let conversation = state.chats.conversation(&auth.user_id, &chat_id).await?;
    Ok(Json(ConversationResponse { conversation }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AgentError::NotOwner {
                    chat_id: "c".into(),
                    user_id: "u".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (AgentError::ChatNotFound("c".into()), StatusCode::NOT_FOUND),
            (AgentError::UpstreamUnavailable("x".into()), StatusCode::BAD_GATEWAY),
            (AgentError::MalformedToolCall("x".into()), StatusCode::BAD_GATEWAY),
            (AgentError::UnresolvedToolCall("x".into()), StatusCode::BAD_GATEWAY),
            (AgentError::CorruptState("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_not_owner_detail_text() {
        let err = ApiError::from(AgentError::NotOwner {
            chat_id: "c".into(),
            user_id: "u".into(),
        });
        assert_eq!(err.detail, "Chat ID does not belong to this user ID.");
    }
}
