//! SQLite store implementations.
//!
//! Each store follows the same pattern: raw sqlx queries, private Row
//! structs mapped by hand with `try_get`, reads through the reader pool,
//! writes through the single-connection writer pool. Timestamps are
//! RFC 3339 text, ids are uuid text.

pub mod chat;
pub mod feedback;
pub mod login_history;
pub mod pool;
pub mod thread;
pub mod token;
pub mod turn;
pub mod user;

use chrono::{DateTime, Utc};
use colloquy_types::error::StoreError;

pub use pool::{DatabasePool, default_database_url};

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn map_sqlx(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Connection
        }
        _ => StoreError::Query(e.to_string()),
    }
}

/// Test helper: a migrated pool on a throwaway database file.
///
/// The temp directory is leaked so the file outlives the returned pool
/// for the duration of the test process.
#[cfg(test)]
pub(crate) async fn test_pool() -> DatabasePool {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    std::mem::forget(dir);
    DatabasePool::new(&url).await.unwrap()
}
