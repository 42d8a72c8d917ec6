//! Chat store trait definition.

use chrono::{DateTime, Utc};
use colloquy_types::chat::{Chat, ChatId};
use colloquy_types::error::StoreError;
use colloquy_types::thread::ThreadId;

/// Store trait for persisted chat turns.
///
/// Implementations live in colloquy-infra (e.g., SqliteChatStore).
pub trait ChatStore: Send + Sync {
    /// Persist a new turn.
    fn save(&self, chat: &Chat)
    -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Get a turn by its unique ID.
    fn find_by_id(
        &self,
        id: &ChatId,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, StoreError>> + Send;

    /// All turns of one thread, ascending `created_at` (ties ascend by id).
    fn find_by_thread(
        &self,
        thread_id: &ThreadId,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, StoreError>> + Send;

    /// Bulk fetch for listings: turns of all given threads, ascending
    /// within each thread.
    fn find_by_threads(
        &self,
        thread_ids: &[ThreadId],
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, StoreError>> + Send;

    /// Remove every turn of a thread.
    fn delete_by_thread(
        &self,
        thread_id: &ThreadId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Number of turns created in the half-open range `[from, to)`.
    fn count_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Turns created in `[from, to)`, ascending `created_at`.
    fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, StoreError>> + Send;
}
