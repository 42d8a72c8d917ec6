//! Turn orchestration: one question in, one persisted turn out.
//!
//! `ChatOrchestrator` runs the whole conversational turn -- thread
//! resolution, history assembly, answer generation, persistence -- as a
//! single unit of work. The provider is called while the unit is open;
//! its latency extends the transaction and that coupling is deliberate.
//! Provider failures degrade into diagnostic answer text and the turn
//! still commits. Store failures roll the whole turn back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use colloquy_types::chat::Chat;
use colloquy_types::error::ChatError;
use colloquy_types::thread::Thread;
use colloquy_types::user::UserId;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::chat::history::HistoryAssembler;
use crate::chat::resolver::ThreadResolver;
use crate::provider::AnswerProvider;
use crate::store::turn::{TurnStore, TurnWork};

/// Longest accepted question, in characters.
pub const MAX_QUESTION_CHARS: usize = 10_000;

/// Command to run one conversational turn.
#[derive(Debug, Clone)]
pub struct CreateChat {
    pub user_id: UserId,
    pub question: String,
    /// Overrides the configured model when present.
    pub model: Option<String>,
    /// Recorded and passed through; transport stays non-streaming.
    pub streaming_requested: bool,
}

/// Everything a completed turn produced.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub chat: Chat,
    pub thread: Thread,
    pub opened_new_thread: bool,
    /// True when the answer is diagnostic text from a failed provider call.
    pub provider_degraded: bool,
}

/// Runs conversational turns.
///
/// Generic over `TurnStore` and `AnswerProvider` to maintain clean
/// architecture (colloquy-core never depends on colloquy-infra).
pub struct ChatOrchestrator<T: TurnStore, P: AnswerProvider> {
    turn_store: T,
    provider: P,
    /// One async mutex per user. A user's turns are strictly serialized
    /// so two near-boundary messages cannot both open threads; distinct
    /// users proceed in parallel.
    user_locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl<T: TurnStore, P: AnswerProvider> ChatOrchestrator<T, P> {
    pub fn new(turn_store: T, provider: P) -> Self {
        Self {
            turn_store,
            provider,
            user_locks: DashMap::new(),
        }
    }

    /// Access the answer provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one turn stamped with the current wall clock.
    pub async fn create_chat(&self, cmd: CreateChat) -> Result<ChatOutcome, ChatError> {
        self.create_chat_at(cmd, Utc::now()).await
    }

    /// Run one turn at an explicit instant.
    ///
    /// Every timestamp of the turn (thread open or renewal, chat
    /// `created_at`) uses this single instant.
    pub async fn create_chat_at(
        &self,
        cmd: CreateChat,
        now: DateTime<Utc>,
    ) -> Result<ChatOutcome, ChatError> {
        validate_question(&cmd.question)?;

        // Clone the Arc out so the map shard is not held across awaits.
        let lock = self
            .user_locks
            .entry(cmd.user_id.clone())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        let mut work = self.turn_store.begin().await?;

        let resolution = ThreadResolver::resolve(&mut work, &cmd.user_id, now).await?;
        let opened_new_thread = resolution.opened_new();

        let history = if opened_new_thread {
            // fresh thread, empty by construction
            Vec::new()
        } else {
            HistoryAssembler::assemble(&mut work, &resolution.thread().id).await?
        };

        let answer = self
            .provider
            .generate_answer(
                &cmd.question,
                &history,
                cmd.model.as_deref(),
                cmd.streaming_requested,
            )
            .await;

        let (answer, provider_degraded) = match answer {
            Ok(text) => (text, false),
            Err(err) => {
                warn!(
                    user_id = %cmd.user_id,
                    error = %err,
                    "Answer generation failed; persisting diagnostic answer"
                );
                (format!("answer generation failed: {err}"), true)
            }
        };

        let thread = resolution.into_thread();
        let chat = Chat::record(thread.id.clone(), cmd.question, answer, now);
        work.insert_turn(&chat).await?;
        work.commit().await?;

        info!(
            chat_id = %chat.id,
            thread_id = %thread.id,
            opened_new_thread,
            provider_degraded,
            "Turn persisted"
        );

        Ok(ChatOutcome {
            chat,
            thread,
            opened_new_thread,
            provider_degraded,
        })
    }
}

fn validate_question(question: &str) -> Result<(), ChatError> {
    if question.trim().is_empty() {
        return Err(ChatError::InvalidQuestion(
            "question must not be blank".to_string(),
        ));
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(ChatError::InvalidQuestion(format!(
            "question must be at most {MAX_QUESTION_CHARS} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailPoint, MemStore, StubProvider};
    use chrono::Duration;
    use colloquy_types::error::ProviderError;
    use colloquy_types::provider::ProviderExchange;

    fn t0() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    fn cmd(user_id: &UserId, question: &str) -> CreateChat {
        CreateChat {
            user_id: user_id.clone(),
            question: question.to_string(),
            model: None,
            streaming_requested: false,
        }
    }

    #[tokio::test]
    async fn test_first_message_creates_thread_and_turn() {
        let store = MemStore::new();
        let orchestrator = ChatOrchestrator::new(store.clone(), StubProvider::answering("A1"));
        let user = UserId::new();

        let outcome = orchestrator
            .create_chat_at(cmd(&user, "Q1"), t0())
            .await
            .unwrap();

        assert!(outcome.opened_new_thread);
        assert!(!outcome.provider_degraded);
        assert_eq!(outcome.thread.last_activity_at, t0());
        assert_eq!(outcome.thread.created_at, t0());
        assert_eq!(outcome.chat.question, "Q1");
        assert_eq!(outcome.chat.answer, "A1");
        assert_eq!(outcome.chat.created_at, t0());
        assert_eq!(store.thread_count(), 1);
        assert_eq!(store.chat_count(), 1);
    }

    #[tokio::test]
    async fn test_second_message_reuses_thread_with_history() {
        let store = MemStore::new();
        let orchestrator = ChatOrchestrator::new(store.clone(), StubProvider::answering("A"));
        let user = UserId::new();

        let first = orchestrator
            .create_chat_at(cmd(&user, "Q1"), t0())
            .await
            .unwrap();

        let t1 = t0() + Duration::minutes(10);
        let second = orchestrator
            .create_chat_at(cmd(&user, "Q2"), t1)
            .await
            .unwrap();

        assert!(!second.opened_new_thread);
        assert_eq!(second.thread.id, first.thread.id);
        assert_eq!(second.thread.last_activity_at, t1);
        assert_eq!(store.thread_count(), 1);

        // the provider saw exactly the first exchange
        let calls = orchestrator.provider().calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].history.is_empty());
        assert_eq!(
            calls[1].history,
            vec![ProviderExchange::new("Q1", "A")]
        );
        assert_eq!(calls[1].question, "Q2");
    }

    #[tokio::test]
    async fn test_message_at_window_boundary_opens_fresh_thread() {
        let store = MemStore::new();
        let orchestrator = ChatOrchestrator::new(store.clone(), StubProvider::answering("A"));
        let user = UserId::new();

        let first = orchestrator
            .create_chat_at(cmd(&user, "Q1"), t0())
            .await
            .unwrap();

        // exactly 30 minutes of silence: expired
        let t1 = t0() + Duration::minutes(30);
        let second = orchestrator
            .create_chat_at(cmd(&user, "Q2"), t1)
            .await
            .unwrap();

        assert!(second.opened_new_thread);
        assert_ne!(second.thread.id, first.thread.id);
        assert_eq!(store.thread_count(), 2);

        // the fresh thread starts with no context
        let calls = orchestrator.provider().calls();
        assert!(calls[1].history.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_but_persists() {
        let store = MemStore::new();
        let orchestrator = ChatOrchestrator::new(
            store.clone(),
            StubProvider::failing(|| ProviderError::RateLimited),
        );
        let user = UserId::new();

        let outcome = orchestrator
            .create_chat_at(cmd(&user, "Q1"), t0())
            .await
            .unwrap();

        assert!(outcome.provider_degraded);
        assert_eq!(outcome.chat.answer, "answer generation failed: rate limited");
        assert_eq!(store.chat_count(), 1);

        let stored = store.stored_chats(&outcome.thread.id);
        assert_eq!(stored[0].answer, "answer generation failed: rate limited");
    }

    #[tokio::test]
    async fn test_degraded_answer_joins_later_history() {
        let store = MemStore::new();
        let failing = ChatOrchestrator::new(
            store.clone(),
            StubProvider::failing(|| ProviderError::Overloaded),
        );
        let user = UserId::new();

        failing.create_chat_at(cmd(&user, "Q1"), t0()).await.unwrap();

        let healthy = ChatOrchestrator::new(store.clone(), StubProvider::answering("A2"));
        let t1 = t0() + Duration::minutes(5);
        healthy.create_chat_at(cmd(&user, "Q2"), t1).await.unwrap();

        let calls = healthy.provider().calls();
        assert_eq!(
            calls[0].history,
            vec![ProviderExchange::new(
                "Q1",
                "answer generation failed: provider overloaded"
            )]
        );
    }

    #[tokio::test]
    async fn test_store_failure_rolls_back_everything() {
        let store = MemStore::failing_at(FailPoint::InsertTurn);
        let orchestrator = ChatOrchestrator::new(store.clone(), StubProvider::answering("A"));
        let user = UserId::new();

        let result = orchestrator.create_chat_at(cmd(&user, "Q1"), t0()).await;

        assert!(matches!(result, Err(ChatError::Store(_))));
        // no orphan thread survives the failed turn
        assert_eq!(store.thread_count(), 0);
        assert_eq!(store.chat_count(), 0);
    }

    #[tokio::test]
    async fn test_commit_failure_leaves_no_partial_work() {
        let store = MemStore::failing_at(FailPoint::Commit);
        let orchestrator = ChatOrchestrator::new(store.clone(), StubProvider::answering("A"));
        let user = UserId::new();

        let result = orchestrator.create_chat_at(cmd(&user, "Q1"), t0()).await;

        assert!(matches!(result, Err(ChatError::Store(_))));
        assert_eq!(store.thread_count(), 0);
        assert_eq!(store.chat_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_question_rejected_before_any_work() {
        let store = MemStore::new();
        let orchestrator = ChatOrchestrator::new(store.clone(), StubProvider::answering("A"));
        let user = UserId::new();

        let result = orchestrator.create_chat_at(cmd(&user, "   "), t0()).await;

        assert!(matches!(result, Err(ChatError::InvalidQuestion(_))));
        assert_eq!(store.thread_count(), 0);
        assert!(orchestrator.provider().calls().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_question_rejected() {
        let store = MemStore::new();
        let orchestrator = ChatOrchestrator::new(store, StubProvider::answering("A"));
        let user = UserId::new();

        let question = "q".repeat(MAX_QUESTION_CHARS + 1);
        let result = orchestrator.create_chat_at(cmd(&user, &question), t0()).await;

        assert!(matches!(result, Err(ChatError::InvalidQuestion(_))));
    }

    #[tokio::test]
    async fn test_model_and_streaming_flag_reach_provider() {
        let store = MemStore::new();
        let orchestrator = ChatOrchestrator::new(store, StubProvider::answering("A"));
        let user = UserId::new();

        let command = CreateChat {
            user_id: user.clone(),
            question: "Q".to_string(),
            model: Some("gpt-4o".to_string()),
            streaming_requested: true,
        };
        orchestrator.create_chat_at(command, t0()).await.unwrap();

        let calls = orchestrator.provider().calls();
        assert_eq!(calls[0].model.as_deref(), Some("gpt-4o"));
        assert!(calls[0].streaming_requested);
    }

    #[tokio::test]
    async fn test_concurrent_same_user_turns_share_one_thread() {
        let store = MemStore::new();
        let orchestrator = Arc::new(ChatOrchestrator::new(
            store.clone(),
            StubProvider::answering("A"),
        ));
        let user = UserId::new();

        let a = {
            let orchestrator = orchestrator.clone();
            let command = cmd(&user, "Q1");
            tokio::spawn(async move { orchestrator.create_chat_at(command, t0()).await })
        };
        let b = {
            let orchestrator = orchestrator.clone();
            let command = cmd(&user, "Q2");
            let t1 = t0() + Duration::minutes(1);
            tokio::spawn(async move { orchestrator.create_chat_at(command, t1).await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // whichever turn ran second must have renewed, not re-opened
        assert_eq!(store.thread_count(), 1);
        assert_eq!(store.chat_count(), 2);
    }
}
