//! Feedback types for Colloquy.
//!
//! A feedback is a thumbs-up/down verdict one user leaves on one chat
//! turn, later triaged by an admin through its status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::chat::ChatId;
use crate::user::UserId;

/// Unique identifier for a feedback entry, wrapping a UUID v7.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub Uuid);

impl FeedbackId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeedbackId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Triage state of a feedback entry.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (status IN ('pending', 'resolved'))`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Pending,
    Resolved,
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackStatus::Pending => write!(f, "pending"),
            FeedbackStatus::Resolved => write!(f, "resolved"),
        }
    }
}

impl FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(FeedbackStatus::Pending),
            "resolved" => Ok(FeedbackStatus::Resolved),
            other => Err(format!("invalid feedback status: '{other}'")),
        }
    }
}

impl Default for FeedbackStatus {
    fn default() -> Self {
        FeedbackStatus::Pending
    }
}

/// One user's verdict on one chat turn.
///
/// At most one feedback exists per `(user_id, chat_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub is_positive: bool,
    pub status: FeedbackStatus,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    /// New pending feedback at `now`.
    pub fn submit(user_id: UserId, chat_id: ChatId, is_positive: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: FeedbackId::new(),
            user_id,
            chat_id,
            is_positive,
            status: FeedbackStatus::Pending,
            created_at: now,
        }
    }

    /// Copy of this feedback with the triage status replaced.
    pub fn with_status(&self, status: FeedbackStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}
