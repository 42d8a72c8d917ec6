//! Transactional unit of work for one conversational turn.
//!
//! A turn reads the user's latest thread, writes the thread (new or
//! renewed), reads the history, and writes the new chat as one atomic
//! unit. The provider call happens while the unit is open, so a failure
//! at any point before commit leaves no partial work behind -- in
//! particular no freshly opened thread without its first turn.

use chrono::{DateTime, Utc};
use colloquy_types::chat::Chat;
use colloquy_types::error::StoreError;
use colloquy_types::thread::{Thread, ThreadId};
use colloquy_types::user::UserId;

/// Factory for turn units.
///
/// Implementations live in colloquy-infra (e.g., SqliteTurnStore, which
/// hands out database transactions).
pub trait TurnStore: Send + Sync {
    type Work: TurnWork;

    /// Open a new unit of work.
    fn begin(&self) -> impl std::future::Future<Output = Result<Self::Work, StoreError>> + Send;
}

/// One open turn unit.
///
/// Dropping a unit without calling [`TurnWork::commit`] rolls back
/// everything written through it.
pub trait TurnWork: Send {
    /// The user's most recently active thread, read inside the unit.
    fn latest_thread_for_user(
        &mut self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<Thread>, StoreError>> + Send;

    /// Write a freshly opened thread.
    fn insert_thread(
        &mut self,
        thread: &Thread,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Renew the activity window of an existing thread to `now`.
    fn touch_thread(
        &mut self,
        id: &ThreadId,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// All turns of the thread, ascending `created_at`.
    fn thread_turns(
        &mut self,
        thread_id: &ThreadId,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, StoreError>> + Send;

    /// Write the new turn.
    fn insert_turn(
        &mut self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Make everything written through this unit durable.
    fn commit(self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
