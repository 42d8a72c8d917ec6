//! Transactional turn unit over a SQLite transaction.
//!
//! `SqliteTurnStore` hands out one writer transaction per conversational
//! turn. All reads and writes of the turn go through that transaction, so
//! dropping the work without commit rolls everything back, including a
//! freshly inserted thread.

use colloquy_core::store::turn::{TurnStore, TurnWork};
use colloquy_types::chat::Chat;
use colloquy_types::error::StoreError;
use colloquy_types::thread::{Thread, ThreadId};
use colloquy_types::user::UserId;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};

use super::chat::ChatRow;
use super::pool::DatabasePool;
use super::thread::ThreadRow;
use super::{format_datetime, map_sqlx};

/// SQLite-backed implementation of `TurnStore`.
pub struct SqliteTurnStore {
    pool: DatabasePool,
}

impl SqliteTurnStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl TurnStore for SqliteTurnStore {
    type Work = SqliteTurnWork;

    async fn begin(&self) -> Result<SqliteTurnWork, StoreError> {
        let tx = self.pool.writer.begin().await.map_err(map_sqlx)?;
        Ok(SqliteTurnWork { tx })
    }
}

/// One open turn transaction. Dropped without commit means rollback.
pub struct SqliteTurnWork {
    tx: Transaction<'static, Sqlite>,
}

impl TurnWork for SqliteTurnWork {
    async fn latest_thread_for_user(
        &mut self,
        user_id: &UserId,
    ) -> Result<Option<Thread>, StoreError> {
        let row = sqlx::query(
            r#"SELECT * FROM chat_threads WHERE user_id = ?
               ORDER BY last_activity_at DESC, created_at DESC, id DESC
               LIMIT 1"#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let thread_row = ThreadRow::from_row(&row).map_err(map_sqlx)?;
                Ok(Some(thread_row.into_domain()?))
            }
            None => Ok(None),
        }
    }

    async fn insert_thread(&mut self, thread: &Thread) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO chat_threads (id, user_id, created_at, last_activity_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(thread.id.to_string())
        .bind(thread.user_id.to_string())
        .bind(format_datetime(&thread.created_at))
        .bind(format_datetime(&thread.last_activity_at))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn touch_thread(&mut self, id: &ThreadId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE chat_threads SET last_activity_at = ? WHERE id = ?")
            .bind(format_datetime(&now))
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn thread_turns(&mut self, thread_id: &ThreadId) -> Result<Vec<Chat>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM chats WHERE thread_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(thread_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row = ChatRow::from_row(row).map_err(map_sqlx)?;
            chats.push(chat_row.into_domain()?);
        }
        Ok(chats)
    }

    async fn insert_turn(&mut self, chat: &Chat) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO chats (id, thread_id, question, answer, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(chat.id.to_string())
        .bind(chat.thread_id.to_string())
        .bind(&chat.question)
        .bind(&chat.answer)
        .bind(format_datetime(&chat.created_at))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx)
    }
}
