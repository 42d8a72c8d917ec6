//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use colloquy_types::error::{ChatError, FeedbackError, StoreError, UserError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Conversational turn and thread errors.
    Chat(ChatError),
    /// Account and authentication errors.
    User(UserError),
    /// Feedback errors.
    Feedback(FeedbackError),
    /// Store failures reaching the surface directly.
    Store(StoreError),
    /// Missing or invalid bearer token.
    Unauthorized(String),
    /// Non-admin caller on an admin surface.
    AccessDenied,
    /// Malformed request input.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        AppError::User(e)
    }
}

impl From<FeedbackError> for AppError {
    fn from(e: FeedbackError) -> Self {
        AppError::Feedback(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl AppError {
    /// `(status, code, message)` triple for the response envelope.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::ThreadNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "THREAD_NOT_FOUND",
                format!("Thread '{id}' not found"),
            ),
            AppError::Chat(ChatError::ChatNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "CHAT_NOT_FOUND",
                format!("Chat '{id}' not found"),
            ),
            AppError::Chat(ChatError::AccessDenied) => (
                StatusCode::FORBIDDEN,
                "ACCESS_DENIED",
                "Access denied".to_string(),
            ),
            AppError::Chat(ChatError::InvalidQuestion(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", msg.clone())
            }
            AppError::Chat(ChatError::Store(e)) => internal(e),

            AppError::User(UserError::DuplicateEmail) => (
                StatusCode::CONFLICT,
                "DUPLICATE_EMAIL",
                "Email already in use".to_string(),
            ),
            AppError::User(UserError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AppError::User(UserError::UserNotFound) => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            AppError::User(UserError::InvalidEmail(msg))
            | AppError::User(UserError::InvalidPassword(msg))
            | AppError::User(UserError::InvalidName(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", msg.clone())
            }
            AppError::User(UserError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or expired token".to_string(),
            ),
            AppError::User(UserError::Hashing(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", e.clone())
            }
            AppError::User(UserError::Store(e)) => internal(e),

            AppError::Feedback(FeedbackError::ChatNotFound) => (
                StatusCode::NOT_FOUND,
                "CHAT_NOT_FOUND",
                "Chat not found".to_string(),
            ),
            AppError::Feedback(FeedbackError::ThreadNotFound) => (
                StatusCode::NOT_FOUND,
                "THREAD_NOT_FOUND",
                "Thread not found".to_string(),
            ),
            AppError::Feedback(FeedbackError::AccessDenied) => (
                StatusCode::FORBIDDEN,
                "ACCESS_DENIED",
                "Access denied".to_string(),
            ),
            AppError::Feedback(FeedbackError::AlreadySubmitted) => (
                StatusCode::CONFLICT,
                "FEEDBACK_ALREADY_EXISTS",
                "Feedback already submitted for this chat".to_string(),
            ),
            AppError::Feedback(FeedbackError::FeedbackNotFound) => (
                StatusCode::NOT_FOUND,
                "FEEDBACK_NOT_FOUND",
                "Feedback not found".to_string(),
            ),
            AppError::Feedback(FeedbackError::Store(e)) => internal(e),

            AppError::Store(e) => internal(e),

            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::AccessDenied => (
                StatusCode::FORBIDDEN,
                "ACCESS_DENIED",
                "Admin privileges required".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", msg.clone())
            }
        }
    }
}

fn internal(e: &StoreError) -> (StatusCode, &'static str, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", e.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
