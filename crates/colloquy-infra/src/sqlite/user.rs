//! SQLite user store implementation.

use colloquy_core::store::Page;
use colloquy_core::store::user::UserStore;
use colloquy_types::error::StoreError;
use colloquy_types::user::{User, UserId, UserRole};
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx, parse_datetime};

/// SQLite-backed implementation of `UserStore`.
pub struct SqliteUserStore {
    pool: DatabasePool,
}

impl SqliteUserStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain User.
pub(crate) struct UserRow {
    id: String,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: String,
}

impl UserRow {
    pub(crate) fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub(crate) fn into_domain(self) -> Result<User, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid user id: {e}")))?;
        let role: UserRole = self.role.parse().map_err(StoreError::Query)?;

        Ok(User {
            id: UserId::from_uuid(id),
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            role,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl UserStore for SqliteUserStore {
    async fn save(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO users (id, email, name, password_hash, role, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(format_datetime(&user.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let user_row = UserRow::from_row(&row).map_err(map_sqlx)?;
                Ok(Some(user_row.into_domain()?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let user_row = UserRow::from_row(&row).map_err(map_sqlx)?;
                Ok(Some(user_row.into_domain()?))
            }
            None => Ok(None),
        }
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count > 0)
    }

    async fn count_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as cnt FROM users WHERE created_at >= ? AND created_at < ?",
        )
        .bind(format_datetime(&from))
        .bind(format_datetime(&to))
        .fetch_one(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count as u64)
    }

    async fn list_all(&self, page: &Page) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?")
            .bind(page.limit as i64)
            .bind(page.offset as i64)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        let mut users = Vec::with_capacity(rows.len());
        for row in &rows {
            let user_row = UserRow::from_row(row).map_err(map_sqlx)?;
            users.push(user_row.into_domain()?);
        }
        Ok(users)
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM users")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx)?;
        Ok(count as u64)
    }
}
