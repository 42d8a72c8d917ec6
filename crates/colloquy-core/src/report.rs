//! Operational reporting.
//!
//! Trailing-24h activity counters and a CSV export of chat turns, both
//! admin-only at the HTTP layer.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use colloquy_types::error::StoreError;
use colloquy_types::thread::ThreadId;
use colloquy_types::user::{User, UserId};

use crate::store::chat::ChatStore;
use crate::store::thread::ThreadStore;
use crate::store::user::{LoginHistoryStore, UserStore};

/// Window covered by a stats report.
const ACTIVITY_WINDOW_HOURS: i64 = 24;

/// Counters over one `[from, to)` window.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ActivityStats {
    pub signups: u64,
    pub logins: u64,
    pub chats: u64,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Activity stats and CSV export.
pub struct ReportService<U, L, C, T>
where
    U: UserStore,
    L: LoginHistoryStore,
    C: ChatStore,
    T: ThreadStore,
{
    users: U,
    logins: L,
    chats: C,
    threads: T,
}

impl<U, L, C, T> ReportService<U, L, C, T>
where
    U: UserStore,
    L: LoginHistoryStore,
    C: ChatStore,
    T: ThreadStore,
{
    pub fn new(users: U, logins: L, chats: C, threads: T) -> Self {
        Self {
            users,
            logins,
            chats,
            threads,
        }
    }

    /// Signups, logins, and chat turns over the trailing 24 hours.
    pub async fn activity_stats(&self, now: DateTime<Utc>) -> Result<ActivityStats, StoreError> {
        let from = now - Duration::hours(ACTIVITY_WINDOW_HOURS);
        Ok(ActivityStats {
            signups: self.users.count_between(from, now).await?,
            logins: self.logins.count_between(from, now).await?,
            chats: self.chats.count_between(from, now).await?,
            from,
            to: now,
        })
    }

    /// Chat turns in `[from, to)` as CSV, one row per turn, joined with the
    /// owning user.
    ///
    /// Leads with a UTF-8 BOM so spreadsheet software picks up the
    /// encoding. A turn whose thread or user row has gone missing is
    /// exported with blank user columns rather than dropped.
    pub async fn chats_csv(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let chats = self.chats.find_between(from, to).await?;

        let mut owners: HashMap<ThreadId, Option<UserId>> = HashMap::new();
        let mut users: HashMap<UserId, Option<User>> = HashMap::new();

        let mut out = String::from("\u{feff}");
        out.push_str("chat_id,user_id,user_email,user_name,question,answer,created_at\n");

        for chat in &chats {
            let owner = match owners.get(&chat.thread_id) {
                Some(cached) => cached.clone(),
                None => {
                    let found = self
                        .threads
                        .find_by_id(&chat.thread_id)
                        .await?
                        .map(|t| t.user_id);
                    owners.insert(chat.thread_id.clone(), found.clone());
                    found
                }
            };

            let user = match &owner {
                Some(user_id) => match users.get(user_id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let found = self.users.find_by_id(user_id).await?;
                        users.insert(user_id.clone(), found.clone());
                        found
                    }
                },
                None => None,
            };

            let (user_id, email, name) = match &user {
                Some(u) => (u.id.to_string(), u.email.clone(), u.name.clone()),
                None => (String::new(), String::new(), String::new()),
            };

            let row = [
                chat.id.to_string(),
                user_id,
                email,
                name,
                chat.question.clone(),
                chat.answer.clone(),
                chat.created_at.to_rfc3339(),
            ];
            let escaped: Vec<String> = row.iter().map(|f| escape_csv(f)).collect();
            out.push_str(&escaped.join(","));
            out.push('\n');
        }

        Ok(out)
    }
}

/// Quote a field when it contains a comma, quote, or line break; inner
/// quotes are doubled.
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
