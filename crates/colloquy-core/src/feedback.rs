//! Feedback on chat turns.
//!
//! `FeedbackService` validates the chat/thread/ownership chain before a
//! verdict is accepted, and exposes the triage and listing operations
//! used by the HTTP surface.

use chrono::Utc;
use colloquy_types::error::{FeedbackError, StoreError};
use colloquy_types::feedback::{Feedback, FeedbackId, FeedbackStatus};
use colloquy_types::user::{User, UserId};
use colloquy_types::chat::ChatId;
use tracing::info;

use crate::store::Page;
use crate::store::chat::ChatStore;
use crate::store::feedback::FeedbackStore;
use crate::store::thread::ThreadStore;

/// Submission, triage, and listing of feedback.
pub struct FeedbackService<F, C, T>
where
    F: FeedbackStore,
    C: ChatStore,
    T: ThreadStore,
{
    feedback: F,
    chats: C,
    threads: T,
}

impl<F, C, T> FeedbackService<F, C, T>
where
    F: FeedbackStore,
    C: ChatStore,
    T: ThreadStore,
{
    pub fn new(feedback: F, chats: C, threads: T) -> Self {
        Self {
            feedback,
            chats,
            threads,
        }
    }

    /// Leave a thumbs-up/down verdict on one chat turn.
    ///
    /// The chat and its thread must exist, non-admin callers must own the
    /// thread, and a user gets one verdict per chat.
    pub async fn submit(
        &self,
        caller: &User,
        chat_id: &ChatId,
        is_positive: bool,
    ) -> Result<Feedback, FeedbackError> {
        let chat = self
            .chats
            .find_by_id(chat_id)
            .await?
            .ok_or(FeedbackError::ChatNotFound)?;

        let thread = self
            .threads
            .find_by_id(&chat.thread_id)
            .await?
            .ok_or(FeedbackError::ThreadNotFound)?;

        if !caller.is_admin() && thread.user_id != caller.id {
            return Err(FeedbackError::AccessDenied);
        }

        if self.feedback.exists_for(&caller.id, chat_id).await? {
            return Err(FeedbackError::AlreadySubmitted);
        }

        let feedback = Feedback::submit(caller.id.clone(), chat_id.clone(), is_positive, Utc::now());
        match self.feedback.save(&feedback).await {
            Ok(()) => {}
            // concurrent double-submit loses to the unique constraint
            Err(StoreError::Conflict(_)) => return Err(FeedbackError::AlreadySubmitted),
            Err(e) => return Err(e.into()),
        }

        info!(feedback_id = %feedback.id, chat_id = %chat_id, is_positive, "Feedback submitted");
        Ok(feedback)
    }

    /// Replace the triage status. Admin surface.
    pub async fn update_status(
        &self,
        id: &FeedbackId,
        status: FeedbackStatus,
    ) -> Result<Feedback, FeedbackError> {
        let feedback = self
            .feedback
            .find_by_id(id)
            .await?
            .ok_or(FeedbackError::FeedbackNotFound)?;

        self.feedback.update_status(id, status.clone()).await?;
        info!(feedback_id = %id, status = %status, "Feedback status updated");
        Ok(feedback.with_status(status))
    }

    /// One user's feedback, newest first, with the total for paging.
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
        is_positive: Option<bool>,
        page: &Page,
    ) -> Result<(Vec<Feedback>, u64), FeedbackError> {
        let items = self.feedback.list_for_user(user_id, is_positive, page).await?;
        let total = self.feedback.count_for_user(user_id, is_positive).await?;
        Ok((items, total))
    }

    /// All feedback, newest first, with the total for paging. Admin surface.
    pub async fn list_all(
        &self,
        is_positive: Option<bool>,
        page: &Page,
    ) -> Result<(Vec<Feedback>, u64), FeedbackError> {
        let items = self.feedback.list_all(is_positive, page).await?;
        let total = self.feedback.count_all(is_positive).await?;
        Ok((items, total))
    }
}
