use thiserror::Error;

use crate::chat::ChatId;
use crate::thread::ThreadId;

/// Errors from store operations (used by trait definitions in colloquy-core).
///
/// Store failures are infrastructure problems. They always propagate;
/// no service converts them into user-visible answer text.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the answer provider.
///
/// These are never fatal to a conversational turn: the orchestrator
/// absorbs them into the persisted answer text.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingCredentials,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("provider overloaded")]
    Overloaded,

    #[error("provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned no answer")]
    EmptyAnswer,
}

/// Errors related to conversational turns and thread access.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("thread not found: {0}")]
    ThreadNotFound(ThreadId),

    #[error("chat not found: {0}")]
    ChatNotFound(ChatId),

    #[error("access denied")]
    AccessDenied,

    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors related to user accounts and authentication.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("email already in use")]
    DuplicateEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("missing or expired token")]
    Unauthorized,

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors related to feedback operations.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("chat not found")]
    ChatNotFound,

    #[error("thread not found")]
    ThreadNotFound,

    #[error("access denied")]
    AccessDenied,

    #[error("feedback already submitted for this chat")]
    AlreadySubmitted,

    #[error("feedback not found")]
    FeedbackNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read error: {0}")]
    Read(String),

    #[error("config parse error: {0}")]
    Parse(String),
}
