//! Thread store trait definition.

use chrono::{DateTime, Utc};
use colloquy_types::error::StoreError;
use colloquy_types::thread::{Thread, ThreadId};
use colloquy_types::user::UserId;

use super::Page;

/// Store trait for thread persistence.
///
/// Implementations live in colloquy-infra (e.g., SqliteThreadStore).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ThreadStore: Send + Sync {
    /// Persist a new thread.
    fn save(
        &self,
        thread: &Thread,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Get a thread by its unique ID.
    fn find_by_id(
        &self,
        id: &ThreadId,
    ) -> impl std::future::Future<Output = Result<Option<Thread>, StoreError>> + Send;

    /// The user's most recently active thread, if any.
    ///
    /// Ordered by `last_activity_at`, ties broken by `created_at` then id,
    /// so the result is deterministic under equal timestamps.
    fn find_latest_by_user(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<Thread>, StoreError>> + Send;

    /// Renew the activity window of an existing thread to `now`.
    ///
    /// Returns `StoreError::NotFound` if the thread does not exist.
    fn touch(
        &self,
        id: &ThreadId,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a thread. Its chats cascade.
    fn delete(
        &self,
        id: &ThreadId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// One user's threads, newest activity first.
    fn list_by_user(
        &self,
        user_id: &UserId,
        page: &Page,
    ) -> impl std::future::Future<Output = Result<Vec<Thread>, StoreError>> + Send;

    /// Every thread in the system, newest activity first.
    fn list_all(
        &self,
        page: &Page,
    ) -> impl std::future::Future<Output = Result<Vec<Thread>, StoreError>> + Send;

    /// Total thread count for one user (paging metadata).
    fn count_by_user(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Total thread count (paging metadata).
    fn count_all(&self) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}
