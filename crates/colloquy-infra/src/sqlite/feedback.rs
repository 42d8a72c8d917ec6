//! SQLite feedback store implementation.

use colloquy_core::store::Page;
use colloquy_core::store::feedback::FeedbackStore;
use colloquy_types::chat::ChatId;
use colloquy_types::error::StoreError;
use colloquy_types::feedback::{Feedback, FeedbackId, FeedbackStatus};
use colloquy_types::user::UserId;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx, parse_datetime};

/// SQLite-backed implementation of `FeedbackStore`.
pub struct SqliteFeedbackStore {
    pool: DatabasePool,
}

impl SqliteFeedbackStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Feedback.
struct FeedbackRow {
    id: String,
    user_id: String,
    chat_id: String,
    is_positive: i64,
    status: String,
    created_at: String,
}

impl FeedbackRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            chat_id: row.try_get("chat_id")?,
            is_positive: row.try_get("is_positive")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_domain(self) -> Result<Feedback, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid feedback id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| StoreError::Query(format!("invalid user_id: {e}")))?;
        let chat_id = Uuid::parse_str(&self.chat_id)
            .map_err(|e| StoreError::Query(format!("invalid chat_id: {e}")))?;
        let status: FeedbackStatus = self.status.parse().map_err(StoreError::Query)?;

        Ok(Feedback {
            id: FeedbackId::from_uuid(id),
            user_id: UserId::from_uuid(user_id),
            chat_id: ChatId::from_uuid(chat_id),
            is_positive: self.is_positive != 0,
            status,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Feedback>, StoreError> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let fb_row = FeedbackRow::from_row(row).map_err(map_sqlx)?;
        items.push(fb_row.into_domain()?);
    }
    Ok(items)
}

/// Optional verdict filter as a SQL fragment.
fn verdict_clause(is_positive: Option<bool>) -> &'static str {
    match is_positive {
        Some(true) => " AND is_positive = 1",
        Some(false) => " AND is_positive = 0",
        None => "",
    }
}

impl FeedbackStore for SqliteFeedbackStore {
    async fn save(&self, feedback: &Feedback) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO feedback (id, user_id, chat_id, is_positive, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(feedback.id.to_string())
        .bind(feedback.user_id.to_string())
        .bind(feedback.chat_id.to_string())
        .bind(feedback.is_positive as i64)
        .bind(feedback.status.to_string())
        .bind(format_datetime(&feedback.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &FeedbackId) -> Result<Option<Feedback>, StoreError> {
        let row = sqlx::query("SELECT * FROM feedback WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let fb_row = FeedbackRow::from_row(&row).map_err(map_sqlx)?;
                Ok(Some(fb_row.into_domain()?))
            }
            None => Ok(None),
        }
    }

    async fn exists_for(&self, user_id: &UserId, chat_id: &ChatId) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as cnt FROM feedback WHERE user_id = ? AND chat_id = ?",
        )
        .bind(user_id.to_string())
        .bind(chat_id.to_string())
        .fetch_one(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count > 0)
    }

    async fn update_status(
        &self,
        id: &FeedbackId,
        status: FeedbackStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE feedback SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        is_positive: Option<bool>,
        page: &Page,
    ) -> Result<Vec<Feedback>, StoreError> {
        let sql = format!(
            "SELECT * FROM feedback WHERE user_id = ?{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            verdict_clause(is_positive)
        );

        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(page.limit as i64)
            .bind(page.offset as i64)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        map_rows(&rows)
    }

    async fn count_for_user(
        &self,
        user_id: &UserId,
        is_positive: Option<bool>,
    ) -> Result<u64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) as cnt FROM feedback WHERE user_id = ?{}",
            verdict_clause(is_positive)
        );

        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count as u64)
    }

    async fn list_all(
        &self,
        is_positive: Option<bool>,
        page: &Page,
    ) -> Result<Vec<Feedback>, StoreError> {
        let sql = format!(
            "SELECT * FROM feedback WHERE 1 = 1{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            verdict_clause(is_positive)
        );

        let rows = sqlx::query(&sql)
            .bind(page.limit as i64)
            .bind(page.offset as i64)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        map_rows(&rows)
    }

    async fn count_all(&self, is_positive: Option<bool>) -> Result<u64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) as cnt FROM feedback WHERE 1 = 1{}",
            verdict_clause(is_positive)
        );

        let row = sqlx::query(&sql)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count as u64)
    }
}
