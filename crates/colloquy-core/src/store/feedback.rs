//! Feedback store trait definition.

use colloquy_types::chat::ChatId;
use colloquy_types::error::StoreError;
use colloquy_types::feedback::{Feedback, FeedbackId, FeedbackStatus};
use colloquy_types::user::UserId;

use super::Page;

/// Store trait for feedback persistence.
///
/// Implementations live in colloquy-infra (e.g., SqliteFeedbackStore).
pub trait FeedbackStore: Send + Sync {
    /// Persist new feedback. Returns `StoreError::Conflict` when the user
    /// already submitted feedback for this chat.
    fn save(
        &self,
        feedback: &Feedback,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn find_by_id(
        &self,
        id: &FeedbackId,
    ) -> impl std::future::Future<Output = Result<Option<Feedback>, StoreError>> + Send;

    fn exists_for(
        &self,
        user_id: &UserId,
        chat_id: &ChatId,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Replace the triage status. `StoreError::NotFound` if absent.
    fn update_status(
        &self,
        id: &FeedbackId,
        status: FeedbackStatus,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// One user's feedback, newest first, optionally filtered by verdict.
    fn list_for_user(
        &self,
        user_id: &UserId,
        is_positive: Option<bool>,
        page: &Page,
    ) -> impl std::future::Future<Output = Result<Vec<Feedback>, StoreError>> + Send;

    fn count_for_user(
        &self,
        user_id: &UserId,
        is_positive: Option<bool>,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// All feedback, newest first, optionally filtered by verdict.
    fn list_all(
        &self,
        is_positive: Option<bool>,
        page: &Page,
    ) -> impl std::future::Future<Output = Result<Vec<Feedback>, StoreError>> + Send;

    fn count_all(
        &self,
        is_positive: Option<bool>,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}
