//! Conversation thread types for Colloquy.
//!
//! A thread groups consecutive turns of one user. It stays live while the
//! user keeps talking and expires after [`SESSION_WINDOW`] minutes of
//! inactivity,
//! at which point the next message opens a fresh thread.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Inactivity window, in minutes, after which a thread no longer accepts
/// new turns.
///
/// The boundary is inclusive: a message arriving exactly 30 minutes after
/// the last activity starts a new thread.
pub const SESSION_WINDOW: i64 = 30;

/// The inactivity window as a `chrono::Duration`.
pub fn session_window() -> Duration {
    Duration::minutes(SESSION_WINDOW)
}

/// Unique identifier for a thread, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub Uuid);

impl ThreadId {
    /// Create a new ThreadId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a ThreadId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ThreadId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A conversation thread owned by a single user.
///
/// Threads are immutable values. Renewing the activity window produces a
/// new value via [`Thread::touched`] together with an explicit store write;
/// nothing mutates a thread in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub user_id: UserId,
    /// Timestamp of the most recent turn (or creation, for a fresh thread).
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    /// Open a fresh thread at `now`. `last_activity_at` equals `created_at`.
    pub fn open(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ThreadId::new(),
            user_id,
            last_activity_at: now,
            created_at: now,
        }
    }

    /// Copy of this thread with the activity window renewed to `now`.
    pub fn touched(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_activity_at: now,
            ..self.clone()
        }
    }

    /// Whether the thread has passed its inactivity window at `now`.
    ///
    /// Inclusive at the boundary: exactly [`SESSION_WINDOW`] minutes of
    /// silence means expired. A `now` earlier than `last_activity_at`
    /// (clock skew) counts as live.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_activity_at) >= session_window()
    }
}
