//! User, token, and login-history store trait definitions.

use chrono::{DateTime, Utc};
use colloquy_types::error::StoreError;
use colloquy_types::user::{AccessToken, User, UserId};

use super::Page;

/// Store trait for user accounts.
///
/// Implementations live in colloquy-infra (e.g., SqliteUserStore).
pub trait UserStore: Send + Sync {
    /// Persist a new user. Returns `StoreError::Conflict` when the email
    /// is already taken.
    fn save(&self, user: &User)
    -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn find_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Lookup by email. Callers pass the normalized (lowercased) form.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, StoreError>> + Send;

    fn exists_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Accounts created in the half-open range `[from, to)`.
    fn count_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Every account, newest first.
    fn list_all(
        &self,
        page: &Page,
    ) -> impl std::future::Future<Output = Result<Vec<User>, StoreError>> + Send;

    fn count_all(&self) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}

/// Store trait for issued bearer tokens.
pub trait TokenStore: Send + Sync {
    fn save(
        &self,
        token: &AccessToken,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Resolve a token hash to its owning user, skipping expired rows.
    fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Option<(AccessToken, User)>, StoreError>> + Send;

    /// Drop expired rows. Returns the number removed.
    fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Revoke every token of one user.
    fn delete_for_user(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Store trait for the append-only login history.
pub trait LoginHistoryStore: Send + Sync {
    fn record(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Logins in the half-open range `[from, to)`.
    fn count_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}
