//! Chat turn types for Colloquy.
//!
//! A chat is one question/answer exchange persisted inside a thread.
//! Turns are immutable once written; the answer field may carry a
//! degraded diagnostic string when the provider failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::thread::ThreadId;

/// Unique identifier for a chat turn, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub Uuid);

impl ChatId {
    /// Create a new ChatId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a ChatId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ChatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One persisted question/answer turn within a thread.
///
/// Turns are ordered by `created_at` within a thread (UUID v7 ids break
/// ties in insert order). The answer is stored as produced, including
/// degraded diagnostic text from a failed provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub thread_id: ThreadId,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Record a turn at `now` with a freshly minted id.
    pub fn record(
        thread_id: ThreadId,
        question: impl Into<String>,
        answer: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ChatId::new(),
            thread_id,
            question: question.into(),
            answer: answer.into(),
            created_at: now,
        }
    }
}
