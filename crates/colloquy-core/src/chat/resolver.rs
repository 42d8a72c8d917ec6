//! Thread resolution: which thread receives the next turn.
//!
//! Runs inside an open turn unit so the latest-thread read and the
//! thread write land in the same transaction as the rest of the turn.

use chrono::{DateTime, Utc};
use colloquy_types::error::StoreError;
use colloquy_types::thread::Thread;
use colloquy_types::user::UserId;
use tracing::info;

use crate::store::turn::TurnWork;

/// Outcome of resolving a user's active thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No live thread existed; a fresh one was opened at `now`.
    Opened(Thread),
    /// A live thread was found and its activity window renewed to `now`.
    Renewed(Thread),
}

impl Resolution {
    pub fn thread(&self) -> &Thread {
        match self {
            Resolution::Opened(t) | Resolution::Renewed(t) => t,
        }
    }

    pub fn into_thread(self) -> Thread {
        match self {
            Resolution::Opened(t) | Resolution::Renewed(t) => t,
        }
    }

    pub fn opened_new(&self) -> bool {
        matches!(self, Resolution::Opened(_))
    }
}

/// Decides between reusing the user's latest thread and opening a new one.
pub struct ThreadResolver;

impl ThreadResolver {
    /// Resolve the thread that receives a turn arriving at `now`.
    ///
    /// The latest thread is reused iff it exists and has not expired;
    /// reuse renews its activity window with an explicit store write.
    /// Absent or expired, a fresh thread is opened with
    /// `last_activity_at = created_at = now`. Exactly one write happens
    /// either way.
    pub async fn resolve<W: TurnWork>(
        work: &mut W,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Resolution, StoreError> {
        let latest = work.latest_thread_for_user(user_id).await?;

        match latest {
            Some(thread) if !thread.is_expired(now) => {
                work.touch_thread(&thread.id, now).await?;
                let renewed = thread.touched(now);
                info!(thread_id = %renewed.id, user_id = %user_id, "Thread renewed");
                Ok(Resolution::Renewed(renewed))
            }
            _ => {
                let thread = Thread::open(user_id.clone(), now);
                work.insert_thread(&thread).await?;
                info!(thread_id = %thread.id, user_id = %user_id, "Thread opened");
                Ok(Resolution::Opened(thread))
            }
        }
    }
}
