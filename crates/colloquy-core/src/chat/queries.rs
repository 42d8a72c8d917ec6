//! Read side of the chat surface.
//!
//! `ChatQueries` serves the thread listings and thread deletion. Listings
//! bulk-fetch turns for a page of threads instead of issuing one query per
//! thread.

use std::collections::HashMap;

use colloquy_types::chat::Chat;
use colloquy_types::error::ChatError;
use colloquy_types::thread::{Thread, ThreadId};
use colloquy_types::user::{User, UserId};
use tracing::info;

use crate::store::Page;
use crate::store::chat::ChatStore;
use crate::store::thread::ThreadStore;

/// One thread with all of its turns, ascending.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ThreadWithChats {
    pub thread: Thread,
    pub chats: Vec<Chat>,
}

/// One page of threads plus the total for paging metadata.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ThreadPage {
    pub threads: Vec<ThreadWithChats>,
    pub total: u64,
}

/// Listing and deletion of threads.
pub struct ChatQueries<T, C>
where
    T: ThreadStore,
    C: ChatStore,
{
    threads: T,
    chats: C,
}

impl<T, C> ChatQueries<T, C>
where
    T: ThreadStore,
    C: ChatStore,
{
    pub fn new(threads: T, chats: C) -> Self {
        Self { threads, chats }
    }

    /// One user's threads, newest activity first, each with its turns.
    pub async fn threads_for_user(
        &self,
        user_id: &UserId,
        page: &Page,
    ) -> Result<ThreadPage, ChatError> {
        let threads = self.threads.list_by_user(user_id, page).await?;
        let total = self.threads.count_by_user(user_id).await?;
        self.assemble_page(threads, total).await
    }

    /// Every thread in the system, newest activity first. Admin surface.
    pub async fn all_threads(&self, page: &Page) -> Result<ThreadPage, ChatError> {
        let threads = self.threads.list_all(page).await?;
        let total = self.threads.count_all().await?;
        self.assemble_page(threads, total).await
    }

    /// Delete a thread and its turns. Non-admin callers may delete only
    /// their own threads.
    pub async fn delete_thread(&self, caller: &User, id: &ThreadId) -> Result<(), ChatError> {
        let thread = self
            .threads
            .find_by_id(id)
            .await?
            .ok_or_else(|| ChatError::ThreadNotFound(id.clone()))?;

        if !caller.is_admin() && thread.user_id != caller.id {
            return Err(ChatError::AccessDenied);
        }

        // The schema cascades too; deleting turns first keeps store
        // implementations without FK enforcement consistent.
        self.chats.delete_by_thread(id).await?;
        self.threads.delete(id).await?;

        info!(thread_id = %id, user_id = %caller.id, "Thread deleted");
        Ok(())
    }

    async fn assemble_page(
        &self,
        threads: Vec<Thread>,
        total: u64,
    ) -> Result<ThreadPage, ChatError> {
        let ids: Vec<ThreadId> = threads.iter().map(|t| t.id.clone()).collect();
        let mut grouped: HashMap<ThreadId, Vec<Chat>> = HashMap::new();
        for chat in self.chats.find_by_threads(&ids).await? {
            grouped.entry(chat.thread_id.clone()).or_default().push(chat);
        }

        let threads = threads
            .into_iter()
            .map(|thread| {
                let chats = grouped.remove(&thread.id).unwrap_or_default();
                ThreadWithChats { thread, chats }
            })
            .collect();

        Ok(ThreadPage { threads, total })
    }
}
