//! SQLite access-token store implementation.

use colloquy_core::store::user::TokenStore;
use colloquy_types::error::StoreError;
use colloquy_types::user::{AccessToken, TokenId, User, UserId};
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx, parse_datetime};

/// SQLite-backed implementation of `TokenStore`.
pub struct SqliteTokenStore {
    pool: DatabasePool,
}

impl SqliteTokenStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain AccessToken.
struct TokenRow {
    id: String,
    user_id: String,
    token_hash: String,
    expires_at: String,
    created_at: String,
}

impl TokenRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            token_hash: row.try_get("token_hash")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_domain(self) -> Result<AccessToken, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid token id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| StoreError::Query(format!("invalid user_id: {e}")))?;

        Ok(AccessToken {
            id: TokenId::from_uuid(id),
            user_id: UserId::from_uuid(user_id),
            token_hash: self.token_hash,
            expires_at: parse_datetime(&self.expires_at)?,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl TokenStore for SqliteTokenStore {
    async fn save(&self, token: &AccessToken) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO access_tokens (id, user_id, token_hash, expires_at, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.token_hash)
        .bind(format_datetime(&token.expires_at))
        .bind(format_datetime(&token.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(AccessToken, User)>, StoreError> {
        // Single joined read so authentication costs one query.
        let row = sqlx::query(
            r#"SELECT t.id, t.user_id, t.token_hash, t.expires_at, t.created_at,
                      u.id as u_id, u.email, u.name, u.password_hash, u.role,
                      u.created_at as u_created_at
               FROM access_tokens t
               JOIN users u ON u.id = t.user_id
               WHERE t.token_hash = ? AND t.expires_at > ?"#,
        )
        .bind(token_hash)
        .bind(format_datetime(&now))
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let token_row = TokenRow::from_row(&row).map_err(map_sqlx)?;
        let token = token_row.into_domain()?;

        let user_id: String = row.try_get("u_id").map_err(map_sqlx)?;
        let user_id = Uuid::parse_str(&user_id)
            .map_err(|e| StoreError::Query(format!("invalid user id: {e}")))?;
        let role: String = row.try_get("role").map_err(map_sqlx)?;
        let created_at: String = row.try_get("u_created_at").map_err(map_sqlx)?;
        let user = User {
            id: UserId::from_uuid(user_id),
            email: row.try_get("email").map_err(map_sqlx)?,
            name: row.try_get("name").map_err(map_sqlx)?,
            password_hash: row.try_get("password_hash").map_err(map_sqlx)?,
            role: role.parse().map_err(StoreError::Query)?,
            created_at: parse_datetime(&created_at)?,
        };

        Ok(Some((token, user)))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at <= ?")
            .bind(format_datetime(&now))
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        Ok(result.rows_affected())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM access_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;
    use crate::sqlite::user::SqliteUserStore;
    use chrono::Duration;
    use colloquy_core::store::user::UserStore;
    use colloquy_types::user::UserRole;

    async fn seed_user(pool: &DatabasePool) -> User {
        let user = User {
            id: UserId::new(),
            email: format!("{}@example.com", Uuid::new_v4()),
            name: "Test".to_string(),
            password_hash: "x".to_string(),
            role: UserRole::Member,
            created_at: Utc::now(),
        };
        SqliteUserStore::new(pool.clone()).save(&user).await.unwrap();
        user
    }

    fn token_for(user: &User, hash: &str, expires_at: DateTime<Utc>) -> AccessToken {
        AccessToken {
            id: TokenId::new(),
            user_id: user.id.clone(),
            token_hash: hash.to_string(),
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_valid_joins_user() {
        let pool = test_pool().await;
        let store = SqliteTokenStore::new(pool.clone());
        let user = seed_user(&pool).await;
        let now = Utc::now();

        store
            .save(&token_for(&user, "hash-1", now + Duration::hours(1)))
            .await
            .unwrap();

        let (token, resolved) = store.find_valid("hash-1", now).await.unwrap().unwrap();
        assert_eq!(token.token_hash, "hash-1");
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, user.email);
    }

    #[tokio::test]
    async fn test_expired_token_not_found() {
        let pool = test_pool().await;
        let store = SqliteTokenStore::new(pool.clone());
        let user = seed_user(&pool).await;
        let now = Utc::now();

        store
            .save(&token_for(&user, "hash-old", now - Duration::hours(1)))
            .await
            .unwrap();
        // boundary: expires_at == now is no longer valid
        store.save(&token_for(&user, "hash-edge", now)).await.unwrap();

        assert!(store.find_valid("hash-old", now).await.unwrap().is_none());
        assert!(store.find_valid("hash-edge", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_counts_rows() {
        let pool = test_pool().await;
        let store = SqliteTokenStore::new(pool.clone());
        let user = seed_user(&pool).await;
        let now = Utc::now();

        store
            .save(&token_for(&user, "stale-1", now - Duration::hours(2)))
            .await
            .unwrap();
        store
            .save(&token_for(&user, "stale-2", now - Duration::hours(1)))
            .await
            .unwrap();
        store
            .save(&token_for(&user, "fresh", now + Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(store.delete_expired(now).await.unwrap(), 2);
        assert!(store.find_valid("fresh", now).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_for_user_revokes_all() {
        let pool = test_pool().await;
        let store = SqliteTokenStore::new(pool.clone());
        let user = seed_user(&pool).await;
        let other = seed_user(&pool).await;
        let later = Utc::now() + Duration::hours(1);

        store.save(&token_for(&user, "mine", later)).await.unwrap();
        store.save(&token_for(&other, "theirs", later)).await.unwrap();

        store.delete_for_user(&user.id).await.unwrap();

        assert!(store.find_valid("mine", Utc::now()).await.unwrap().is_none());
        assert!(store.find_valid("theirs", Utc::now()).await.unwrap().is_some());
    }
}
