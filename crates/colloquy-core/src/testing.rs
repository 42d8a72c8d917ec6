//! In-memory test doubles for the store traits and the provider.
//!
//! `MemStore` backs every store trait with one shared `Vec`-based state,
//! and its turn units stage writes until commit so tests exercise the
//! same no-partial-work contract the SQLite implementations give.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use colloquy_types::chat::{Chat, ChatId};
use colloquy_types::error::{ProviderError, StoreError, UserError};
use colloquy_types::feedback::{Feedback, FeedbackId, FeedbackStatus};
use colloquy_types::provider::ProviderExchange;
use colloquy_types::thread::{Thread, ThreadId};
use colloquy_types::user::{AccessToken, LoginRecord, User, UserId};

use crate::provider::AnswerProvider;
use crate::store::chat::ChatStore;
use crate::store::feedback::FeedbackStore;
use crate::store::thread::ThreadStore;
use crate::store::turn::{TurnStore, TurnWork};
use crate::store::user::{LoginHistoryStore, TokenStore, UserStore};
use crate::store::Page;
use crate::user::password::PasswordHasher;

#[derive(Default)]
struct MemDb {
    users: Vec<User>,
    tokens: Vec<AccessToken>,
    logins: Vec<LoginRecord>,
    threads: Vec<Thread>,
    chats: Vec<Chat>,
    feedback: Vec<Feedback>,
}

/// Which turn operation the store should fail on, for error-path tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertThread,
    InsertTurn,
    Commit,
}

/// In-memory implementation of every store trait.
///
/// Clones share state, so a test can hand one clone to a service and
/// keep another for assertions.
#[derive(Clone, Default)]
pub struct MemStore {
    db: Arc<Mutex<MemDb>>,
    fail_at: Option<FailPoint>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose turn units fail at the given operation.
    pub fn failing_at(point: FailPoint) -> Self {
        Self {
            db: Arc::default(),
            fail_at: Some(point),
        }
    }

    pub fn thread_count(&self) -> usize {
        self.db.lock().unwrap().threads.len()
    }

    pub fn chat_count(&self) -> usize {
        self.db.lock().unwrap().chats.len()
    }

    pub fn stored_thread(&self, id: &ThreadId) -> Option<Thread> {
        self.db
            .lock()
            .unwrap()
            .threads
            .iter()
            .find(|t| &t.id == id)
            .cloned()
    }

    pub fn stored_chats(&self, thread_id: &ThreadId) -> Vec<Chat> {
        let mut chats: Vec<Chat> = self
            .db
            .lock()
            .unwrap()
            .chats
            .iter()
            .filter(|c| &c.thread_id == thread_id)
            .cloned()
            .collect();
        sort_chats_ascending(&mut chats);
        chats
    }

    pub fn login_count(&self) -> usize {
        self.db.lock().unwrap().logins.len()
    }

    pub fn token_count(&self) -> usize {
        self.db.lock().unwrap().tokens.len()
    }
}

fn sort_chats_ascending(chats: &mut [Chat]) {
    chats.sort_by(|a, b| (a.created_at, a.id.0).cmp(&(b.created_at, b.id.0)));
}

fn sort_threads_by_activity(threads: &mut [Thread]) {
    threads.sort_by(|a, b| {
        (b.last_activity_at, b.created_at, b.id.0).cmp(&(a.last_activity_at, a.created_at, a.id.0))
    });
}

fn page_slice<T: Clone>(items: &[T], page: &Page) -> Vec<T> {
    items
        .iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

// --- ThreadStore ---

impl ThreadStore for MemStore {
    async fn save(&self, thread: &Thread) -> Result<(), StoreError> {
        self.db.lock().unwrap().threads.push(thread.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ThreadId) -> Result<Option<Thread>, StoreError> {
        Ok(self.stored_thread(id))
    }

    async fn find_latest_by_user(&self, user_id: &UserId) -> Result<Option<Thread>, StoreError> {
        let mut threads: Vec<Thread> = self
            .db
            .lock()
            .unwrap()
            .threads
            .iter()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect();
        sort_threads_by_activity(&mut threads);
        Ok(threads.into_iter().next())
    }

    async fn touch(&self, id: &ThreadId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut db = self.db.lock().unwrap();
        match db.threads.iter_mut().find(|t| &t.id == id) {
            Some(thread) => {
                thread.last_activity_at = now;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: &ThreadId) -> Result<(), StoreError> {
        let mut db = self.db.lock().unwrap();
        db.threads.retain(|t| &t.id != id);
        db.chats.retain(|c| &c.thread_id != id);
        Ok(())
    }

    async fn list_by_user(&self, user_id: &UserId, page: &Page) -> Result<Vec<Thread>, StoreError> {
        let mut threads: Vec<Thread> = self
            .db
            .lock()
            .unwrap()
            .threads
            .iter()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect();
        sort_threads_by_activity(&mut threads);
        Ok(page_slice(&threads, page))
    }

    async fn list_all(&self, page: &Page) -> Result<Vec<Thread>, StoreError> {
        let mut threads = self.db.lock().unwrap().threads.clone();
        sort_threads_by_activity(&mut threads);
        Ok(page_slice(&threads, page))
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .threads
            .iter()
            .filter(|t| &t.user_id == user_id)
            .count() as u64)
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        Ok(self.db.lock().unwrap().threads.len() as u64)
    }
}

// --- ChatStore ---

impl ChatStore for MemStore {
    async fn save(&self, chat: &Chat) -> Result<(), StoreError> {
        self.db.lock().unwrap().chats.push(chat.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ChatId) -> Result<Option<Chat>, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .chats
            .iter()
            .find(|c| &c.id == id)
            .cloned())
    }

    async fn find_by_thread(&self, thread_id: &ThreadId) -> Result<Vec<Chat>, StoreError> {
        Ok(self.stored_chats(thread_id))
    }

    async fn find_by_threads(&self, thread_ids: &[ThreadId]) -> Result<Vec<Chat>, StoreError> {
        let mut chats: Vec<Chat> = self
            .db
            .lock()
            .unwrap()
            .chats
            .iter()
            .filter(|c| thread_ids.contains(&c.thread_id))
            .cloned()
            .collect();
        sort_chats_ascending(&mut chats);
        Ok(chats)
    }

    async fn delete_by_thread(&self, thread_id: &ThreadId) -> Result<(), StoreError> {
        self.db
            .lock()
            .unwrap()
            .chats
            .retain(|c| &c.thread_id != thread_id);
        Ok(())
    }

    async fn count_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .chats
            .iter()
            .filter(|c| c.created_at >= from && c.created_at < to)
            .count() as u64)
    }

    async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Chat>, StoreError> {
        let mut chats: Vec<Chat> = self
            .db
            .lock()
            .unwrap()
            .chats
            .iter()
            .filter(|c| c.created_at >= from && c.created_at < to)
            .cloned()
            .collect();
        sort_chats_ascending(&mut chats);
        Ok(chats)
    }
}

// --- UserStore ---

impl UserStore for MemStore {
    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut db = self.db.lock().unwrap();
        if db.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' already exists",
                user.email
            )));
        }
        db.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| &u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .users
            .iter()
            .any(|u| u.email == email))
    }

    async fn count_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| u.created_at >= from && u.created_at < to)
            .count() as u64)
    }

    async fn list_all(&self, page: &Page) -> Result<Vec<User>, StoreError> {
        let mut users = self.db.lock().unwrap().users.clone();
        users.sort_by(|a, b| (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0)));
        Ok(page_slice(&users, page))
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        Ok(self.db.lock().unwrap().users.len() as u64)
    }
}

// --- TokenStore ---

impl TokenStore for MemStore {
    async fn save(&self, token: &AccessToken) -> Result<(), StoreError> {
        self.db.lock().unwrap().tokens.push(token.clone());
        Ok(())
    }

    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(AccessToken, User)>, StoreError> {
        let db = self.db.lock().unwrap();
        let token = db
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.is_valid(now))
            .cloned();
        Ok(token.and_then(|t| {
            db.users
                .iter()
                .find(|u| u.id == t.user_id)
                .cloned()
                .map(|u| (t, u))
        }))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut db = self.db.lock().unwrap();
        let before = db.tokens.len();
        db.tokens.retain(|t| t.is_valid(now));
        Ok((before - db.tokens.len()) as u64)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.db
            .lock()
            .unwrap()
            .tokens
            .retain(|t| &t.user_id != user_id);
        Ok(())
    }
}

// --- LoginHistoryStore ---

impl LoginHistoryStore for MemStore {
    async fn record(&self, user_id: &UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.db.lock().unwrap().logins.push(LoginRecord {
            user_id: user_id.clone(),
            logged_in_at: at,
        });
        Ok(())
    }

    async fn count_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .logins
            .iter()
            .filter(|l| l.logged_in_at >= from && l.logged_in_at < to)
            .count() as u64)
    }
}

// --- FeedbackStore ---

fn verdict_matches(feedback: &Feedback, filter: Option<bool>) -> bool {
    filter.is_none_or(|want| feedback.is_positive == want)
}

impl FeedbackStore for MemStore {
    async fn save(&self, feedback: &Feedback) -> Result<(), StoreError> {
        let mut db = self.db.lock().unwrap();
        if db
            .feedback
            .iter()
            .any(|f| f.user_id == feedback.user_id && f.chat_id == feedback.chat_id)
        {
            return Err(StoreError::Conflict(
                "feedback already exists for this chat".to_string(),
            ));
        }
        db.feedback.push(feedback.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &FeedbackId) -> Result<Option<Feedback>, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .feedback
            .iter()
            .find(|f| &f.id == id)
            .cloned())
    }

    async fn exists_for(&self, user_id: &UserId, chat_id: &ChatId) -> Result<bool, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .feedback
            .iter()
            .any(|f| &f.user_id == user_id && &f.chat_id == chat_id))
    }

    async fn update_status(&self, id: &FeedbackId, status: FeedbackStatus) -> Result<(), StoreError> {
        let mut db = self.db.lock().unwrap();
        match db.feedback.iter_mut().find(|f| &f.id == id) {
            Some(feedback) => {
                feedback.status = status;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        is_positive: Option<bool>,
        page: &Page,
    ) -> Result<Vec<Feedback>, StoreError> {
        let mut items: Vec<Feedback> = self
            .db
            .lock()
            .unwrap()
            .feedback
            .iter()
            .filter(|f| &f.user_id == user_id && verdict_matches(f, is_positive))
            .cloned()
            .collect();
        items.sort_by(|a, b| (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0)));
        Ok(page_slice(&items, page))
    }

    async fn count_for_user(
        &self,
        user_id: &UserId,
        is_positive: Option<bool>,
    ) -> Result<u64, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .feedback
            .iter()
            .filter(|f| &f.user_id == user_id && verdict_matches(f, is_positive))
            .count() as u64)
    }

    async fn list_all(
        &self,
        is_positive: Option<bool>,
        page: &Page,
    ) -> Result<Vec<Feedback>, StoreError> {
        let mut items: Vec<Feedback> = self
            .db
            .lock()
            .unwrap()
            .feedback
            .iter()
            .filter(|f| verdict_matches(f, is_positive))
            .cloned()
            .collect();
        items.sort_by(|a, b| (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0)));
        Ok(page_slice(&items, page))
    }

    async fn count_all(&self, is_positive: Option<bool>) -> Result<u64, StoreError> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .feedback
            .iter()
            .filter(|f| verdict_matches(f, is_positive))
            .count() as u64)
    }
}

// --- TurnStore ---

impl TurnStore for MemStore {
    type Work = MemTurnWork;

    async fn begin(&self) -> Result<MemTurnWork, StoreError> {
        Ok(MemTurnWork {
            db: self.db.clone(),
            new_threads: Vec::new(),
            touches: Vec::new(),
            new_chats: Vec::new(),
            fail_at: self.fail_at,
        })
    }
}

/// One open in-memory turn unit. Writes are staged until commit.
pub struct MemTurnWork {
    db: Arc<Mutex<MemDb>>,
    new_threads: Vec<Thread>,
    touches: Vec<(ThreadId, DateTime<Utc>)>,
    new_chats: Vec<Chat>,
    fail_at: Option<FailPoint>,
}

impl MemTurnWork {
    fn touched_view(&self, thread: &Thread) -> Thread {
        let mut view = thread.clone();
        for (id, at) in &self.touches {
            if id == &view.id {
                view.last_activity_at = *at;
            }
        }
        view
    }
}

impl TurnWork for MemTurnWork {
    async fn latest_thread_for_user(
        &mut self,
        user_id: &UserId,
    ) -> Result<Option<Thread>, StoreError> {
        let base = self.db.lock().unwrap();
        let mut candidates: Vec<Thread> = base
            .threads
            .iter()
            .chain(self.new_threads.iter())
            .filter(|t| &t.user_id == user_id)
            .map(|t| self.touched_view(t))
            .collect();
        drop(base);
        sort_threads_by_activity(&mut candidates);
        Ok(candidates.into_iter().next())
    }

    async fn insert_thread(&mut self, thread: &Thread) -> Result<(), StoreError> {
        if self.fail_at == Some(FailPoint::InsertThread) {
            return Err(StoreError::Query("injected insert_thread failure".into()));
        }
        self.new_threads.push(thread.clone());
        Ok(())
    }

    async fn touch_thread(&mut self, id: &ThreadId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let known = self.db.lock().unwrap().threads.iter().any(|t| &t.id == id)
            || self.new_threads.iter().any(|t| &t.id == id);
        if !known {
            return Err(StoreError::NotFound);
        }
        self.touches.push((id.clone(), now));
        Ok(())
    }

    async fn thread_turns(&mut self, thread_id: &ThreadId) -> Result<Vec<Chat>, StoreError> {
        let base = self.db.lock().unwrap();
        let mut turns: Vec<Chat> = base
            .chats
            .iter()
            .chain(self.new_chats.iter())
            .filter(|c| &c.thread_id == thread_id)
            .cloned()
            .collect();
        drop(base);
        sort_chats_ascending(&mut turns);
        Ok(turns)
    }

    async fn insert_turn(&mut self, chat: &Chat) -> Result<(), StoreError> {
        if self.fail_at == Some(FailPoint::InsertTurn) {
            return Err(StoreError::Query("injected insert_turn failure".into()));
        }
        self.new_chats.push(chat.clone());
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        if self.fail_at == Some(FailPoint::Commit) {
            return Err(StoreError::Query("injected commit failure".into()));
        }
        let mut base = self.db.lock().unwrap();
        for (id, at) in &self.touches {
            if let Some(thread) = base.threads.iter_mut().find(|t| &t.id == id) {
                thread.last_activity_at = *at;
            }
        }
        base.threads.extend(self.new_threads);
        base.chats.extend(self.new_chats);
        Ok(())
    }
}

// --- Provider stub ---

/// One recorded provider invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub question: String,
    pub history: Vec<ProviderExchange>,
    pub model: Option<String>,
    pub streaming_requested: bool,
}

type Responder = dyn Fn() -> Result<String, ProviderError> + Send + Sync;

/// Scripted [`AnswerProvider`] that records every invocation.
pub struct StubProvider {
    respond: Box<Responder>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubProvider {
    /// Always answers with `answer`.
    pub fn answering(answer: &str) -> Self {
        let answer = answer.to_string();
        Self {
            respond: Box::new(move || Ok(answer.clone())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fails with the error produced by `make`.
    pub fn failing(make: impl Fn() -> ProviderError + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(move || Err(make())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl AnswerProvider for StubProvider {
    async fn generate_answer(
        &self,
        question: &str,
        history: &[ProviderExchange],
        model: Option<&str>,
        streaming_requested: bool,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            question: question.to_string(),
            history: history.to_vec(),
            model: model.map(str::to_string),
            streaming_requested,
        });
        (self.respond)()
    }
}

// --- Password hasher stub ---

/// Reversible stand-in for the argon2 hasher.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, UserError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, phc: &str) -> Result<bool, UserError> {
        Ok(phc == format!("plain:{password}"))
    }
}
