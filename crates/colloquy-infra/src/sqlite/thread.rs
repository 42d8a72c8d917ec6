//! SQLite thread store implementation.
//!
//! Implements `ThreadStore` from `colloquy-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, manual mapping.

use colloquy_core::store::Page;
use colloquy_core::store::thread::ThreadStore;
use colloquy_types::error::StoreError;
use colloquy_types::thread::{Thread, ThreadId};
use colloquy_types::user::UserId;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx, parse_datetime};

/// SQLite-backed implementation of `ThreadStore`.
pub struct SqliteThreadStore {
    pool: DatabasePool,
}

impl SqliteThreadStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Thread.
pub(crate) struct ThreadRow {
    id: String,
    user_id: String,
    created_at: String,
    last_activity_at: String,
}

impl ThreadRow {
    pub(crate) fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
            last_activity_at: row.try_get("last_activity_at")?,
        })
    }

    pub(crate) fn into_domain(self) -> Result<Thread, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid thread id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| StoreError::Query(format!("invalid user_id: {e}")))?;

        Ok(Thread {
            id: ThreadId::from_uuid(id),
            user_id: UserId::from_uuid(user_id),
            created_at: parse_datetime(&self.created_at)?,
            last_activity_at: parse_datetime(&self.last_activity_at)?,
        })
    }
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Thread>, StoreError> {
    let mut threads = Vec::with_capacity(rows.len());
    for row in rows {
        let thread_row = ThreadRow::from_row(row).map_err(map_sqlx)?;
        threads.push(thread_row.into_domain()?);
    }
    Ok(threads)
}

impl ThreadStore for SqliteThreadStore {
    async fn save(&self, thread: &Thread) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO chat_threads (id, user_id, created_at, last_activity_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(thread.id.to_string())
        .bind(thread.user_id.to_string())
        .bind(format_datetime(&thread.created_at))
        .bind(format_datetime(&thread.last_activity_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ThreadId) -> Result<Option<Thread>, StoreError> {
        let row = sqlx::query("SELECT * FROM chat_threads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
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

    async fn find_latest_by_user(&self, user_id: &UserId) -> Result<Option<Thread>, StoreError> {
        let row = sqlx::query(
            r#"SELECT * FROM chat_threads WHERE user_id = ?
               ORDER BY last_activity_at DESC, created_at DESC, id DESC
               LIMIT 1"#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool.reader)
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

    async fn touch(&self, id: &ThreadId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE chat_threads SET last_activity_at = ? WHERE id = ?")
            .bind(format_datetime(&now))
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &ThreadId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM chat_threads WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn list_by_user(&self, user_id: &UserId, page: &Page) -> Result<Vec<Thread>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chat_threads WHERE user_id = ?
               ORDER BY last_activity_at DESC, created_at DESC, id DESC
               LIMIT ? OFFSET ?"#,
        )
        .bind(user_id.to_string())
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        map_rows(&rows)
    }

    async fn list_all(&self, page: &Page) -> Result<Vec<Thread>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chat_threads
               ORDER BY last_activity_at DESC, created_at DESC, id DESC
               LIMIT ? OFFSET ?"#,
        )
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        map_rows(&rows)
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_threads WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count as u64)
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_threads")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;
    use crate::sqlite::user::SqliteUserStore;
    use chrono::Duration;
    use colloquy_core::store::user::UserStore;
    use colloquy_types::user::{User, UserRole};

    async fn seed_user(pool: &DatabasePool) -> UserId {
        let user = User {
            id: UserId::new(),
            email: format!("{}@example.com", Uuid::new_v4()),
            name: "Test".to_string(),
            password_hash: "x".to_string(),
            role: UserRole::Member,
            created_at: Utc::now(),
        };
        SqliteUserStore::new(pool.clone()).save(&user).await.unwrap();
        user.id
    }

    #[tokio::test]
    async fn test_save_and_find_roundtrip() {
        let pool = test_pool().await;
        let store = SqliteThreadStore::new(pool.clone());
        let user_id = seed_user(&pool).await;

        let thread = Thread::open(user_id, Utc::now());
        store.save(&thread).await.unwrap();

        let found = store.find_by_id(&thread.id).await.unwrap().unwrap();
        assert_eq!(found.id, thread.id);
        assert_eq!(found.user_id, thread.user_id);
    }

    #[tokio::test]
    async fn test_find_latest_orders_by_activity() {
        let pool = test_pool().await;
        let store = SqliteThreadStore::new(pool.clone());
        let user_id = seed_user(&pool).await;
        let now = Utc::now();

        let older = Thread::open(user_id.clone(), now - Duration::hours(2));
        let newer = Thread::open(user_id.clone(), now);
        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let latest = store.find_latest_by_user(&user_id).await.unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
    }

    #[tokio::test]
    async fn test_touch_renews_activity() {
        let pool = test_pool().await;
        let store = SqliteThreadStore::new(pool.clone());
        let user_id = seed_user(&pool).await;
        let now = Utc::now();

        let thread = Thread::open(user_id, now - Duration::minutes(10));
        store.save(&thread).await.unwrap();
        store.touch(&thread.id, now).await.unwrap();

        let found = store.find_by_id(&thread.id).await.unwrap().unwrap();
        assert_eq!(found.last_activity_at, now);
        assert_eq!(found.created_at, thread.created_at);
    }

    #[tokio::test]
    async fn test_touch_unknown_thread_is_not_found() {
        let pool = test_pool().await;
        let store = SqliteThreadStore::new(pool);

        let result = store.touch(&ThreadId::new(), Utc::now()).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_by_user_pages() {
        let pool = test_pool().await;
        let store = SqliteThreadStore::new(pool.clone());
        let user_id = seed_user(&pool).await;
        let now = Utc::now();

        for i in 0..3 {
            let thread = Thread::open(user_id.clone(), now + Duration::seconds(i));
            store.save(&thread).await.unwrap();
        }

        let page = store
            .list_by_user(&user_id, &Page::new(Some(2), None))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert!(page[0].last_activity_at >= page[1].last_activity_at);
        assert_eq!(store.count_by_user(&user_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_cascades_nothing_without_chats() {
        let pool = test_pool().await;
        let store = SqliteThreadStore::new(pool.clone());
        let user_id = seed_user(&pool).await;

        let thread = Thread::open(user_id, Utc::now());
        store.save(&thread).await.unwrap();
        store.delete(&thread.id).await.unwrap();

        assert!(store.find_by_id(&thread.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete(&thread.id).await,
            Err(StoreError::NotFound)
        ));
    }
}
