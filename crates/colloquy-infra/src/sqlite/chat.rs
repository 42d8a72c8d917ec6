//! SQLite chat store implementation.
//!
//! Implements `ChatStore` from `colloquy-core` using sqlx with split
//! read/write pools. Follows the same patterns as `SqliteThreadStore`:
//! raw queries, a private Row struct, manual mapping.

use colloquy_core::store::chat::ChatStore;
use colloquy_types::chat::{Chat, ChatId};
use colloquy_types::error::StoreError;
use colloquy_types::thread::ThreadId;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx, parse_datetime};

/// SQLite-backed implementation of `ChatStore`.
pub struct SqliteChatStore {
    pool: DatabasePool,
}

impl SqliteChatStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Chat.
pub(crate) struct ChatRow {
    id: String,
    thread_id: String,
    question: String,
    answer: String,
    created_at: String,
}

impl ChatRow {
    pub(crate) fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            thread_id: row.try_get("thread_id")?,
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub(crate) fn into_domain(self) -> Result<Chat, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid chat id: {e}")))?;
        let thread_id = Uuid::parse_str(&self.thread_id)
            .map_err(|e| StoreError::Query(format!("invalid thread_id: {e}")))?;

        Ok(Chat {
            id: ChatId::from_uuid(id),
            thread_id: ThreadId::from_uuid(thread_id),
            question: self.question,
            answer: self.answer,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Chat>, StoreError> {
    let mut chats = Vec::with_capacity(rows.len());
    for row in rows {
        let chat_row = ChatRow::from_row(row).map_err(map_sqlx)?;
        chats.push(chat_row.into_domain()?);
    }
    Ok(chats)
}

impl ChatStore for SqliteChatStore {
    async fn save(&self, chat: &Chat) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO chats (id, thread_id, question, answer, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(chat.id.to_string())
        .bind(chat.thread_id.to_string())
        .bind(&chat.question)
        .bind(&chat.answer)
        .bind(format_datetime(&chat.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ChatId) -> Result<Option<Chat>, StoreError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let chat_row = ChatRow::from_row(&row).map_err(map_sqlx)?;
                Ok(Some(chat_row.into_domain()?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_thread(&self, thread_id: &ThreadId) -> Result<Vec<Chat>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM chats WHERE thread_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(thread_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        map_rows(&rows)
    }

    async fn find_by_threads(&self, thread_ids: &[ThreadId]) -> Result<Vec<Chat>, StoreError> {
        if thread_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; thread_ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM chats WHERE thread_id IN ({placeholders}) ORDER BY thread_id, created_at ASC, id ASC"
        );

        let mut query = sqlx::query(&sql);
        for id in thread_ids {
            query = query.bind(id.to_string());
        }

        let rows = query.fetch_all(&self.pool.reader).await.map_err(map_sqlx)?;
        map_rows(&rows)
    }

    async fn delete_by_thread(&self, thread_id: &ThreadId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM chats WHERE thread_id = ?")
            .bind(thread_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        Ok(())
    }

    async fn count_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as cnt FROM chats WHERE created_at >= ? AND created_at < ?",
        )
        .bind(format_datetime(&from))
        .bind(format_datetime(&to))
        .fetch_one(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count as u64)
    }

    async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Chat>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chats WHERE created_at >= ? AND created_at < ?
               ORDER BY created_at ASC, id ASC"#,
        )
        .bind(format_datetime(&from))
        .bind(format_datetime(&to))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        map_rows(&rows)
    }
}
