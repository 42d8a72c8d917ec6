//! SQLite login-history store implementation.
//!
//! Append-only rows used by the activity report; nothing reads individual
//! records back.

use colloquy_core::store::user::LoginHistoryStore;
use colloquy_types::error::StoreError;
use colloquy_types::user::UserId;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx};

/// SQLite-backed implementation of `LoginHistoryStore`.
pub struct SqliteLoginHistoryStore {
    pool: DatabasePool,
}

impl SqliteLoginHistoryStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl LoginHistoryStore for SqliteLoginHistoryStore {
    async fn record(&self, user_id: &UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO login_history (user_id, logged_in_at) VALUES (?, ?)")
            .bind(user_id.to_string())
            .bind(format_datetime(&at))
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
            "SELECT COUNT(*) as cnt FROM login_history WHERE logged_in_at >= ? AND logged_in_at < ?",
        )
        .bind(format_datetime(&from))
        .bind(format_datetime(&to))
        .fetch_one(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count as u64)
    }
}
