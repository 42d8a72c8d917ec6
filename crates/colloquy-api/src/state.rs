//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. Services are generic over store/provider/hasher traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;

use colloquy_core::chat::orchestrator::ChatOrchestrator;
use colloquy_core::chat::queries::ChatQueries;
use colloquy_core::feedback::FeedbackService;
use colloquy_core::report::ReportService;
use colloquy_core::user::UserService;
use colloquy_infra::config::{data_dir, load_global_config};
use colloquy_infra::crypto::password::Argon2PasswordHasher;
use colloquy_infra::llm::openai::OpenAiProvider;
use colloquy_infra::sqlite::chat::SqliteChatStore;
use colloquy_infra::sqlite::feedback::SqliteFeedbackStore;
use colloquy_infra::sqlite::login_history::SqliteLoginHistoryStore;
use colloquy_infra::sqlite::thread::SqliteThreadStore;
use colloquy_infra::sqlite::token::SqliteTokenStore;
use colloquy_infra::sqlite::turn::SqliteTurnStore;
use colloquy_infra::sqlite::user::SqliteUserStore;
use colloquy_infra::sqlite::{default_database_url, DatabasePool};
use colloquy_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteUserService =
    UserService<SqliteUserStore, SqliteTokenStore, SqliteLoginHistoryStore, Argon2PasswordHasher>;

pub type ConcreteOrchestrator = ChatOrchestrator<SqliteTurnStore, OpenAiProvider>;

pub type ConcreteChatQueries = ChatQueries<SqliteThreadStore, SqliteChatStore>;

pub type ConcreteFeedbackService =
    FeedbackService<SqliteFeedbackStore, SqliteChatStore, SqliteThreadStore>;

pub type ConcreteReportService =
    ReportService<SqliteUserStore, SqliteLoginHistoryStore, SqliteChatStore, SqliteThreadStore>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<ConcreteUserService>,
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub chat_queries: Arc<ConcreteChatQueries>,
    pub feedback_service: Arc<ConcreteFeedbackService>,
    pub report_service: Arc<ConcreteReportService>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to the
    /// database, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let db_url = config
            .database
            .url
            .clone()
            .unwrap_or_else(default_database_url);
        let db_pool = DatabasePool::new(&db_url).await?;

        let user_service = UserService::new(
            SqliteUserStore::new(db_pool.clone()),
            SqliteTokenStore::new(db_pool.clone()),
            SqliteLoginHistoryStore::new(db_pool.clone()),
            Argon2PasswordHasher::new(),
        )
        .with_token_ttl(Duration::hours(config.auth.token_ttl_hours as i64));

        let provider = OpenAiProvider::from_env(&config.provider);
        let orchestrator = ChatOrchestrator::new(SqliteTurnStore::new(db_pool.clone()), provider);

        let chat_queries = ChatQueries::new(
            SqliteThreadStore::new(db_pool.clone()),
            SqliteChatStore::new(db_pool.clone()),
        );

        let feedback_service = FeedbackService::new(
            SqliteFeedbackStore::new(db_pool.clone()),
            SqliteChatStore::new(db_pool.clone()),
            SqliteThreadStore::new(db_pool.clone()),
        );

        let report_service = ReportService::new(
            SqliteUserStore::new(db_pool.clone()),
            SqliteLoginHistoryStore::new(db_pool.clone()),
            SqliteChatStore::new(db_pool.clone()),
            SqliteThreadStore::new(db_pool.clone()),
        );

        Ok(Self {
            user_service: Arc::new(user_service),
            orchestrator: Arc::new(orchestrator),
            chat_queries: Arc::new(chat_queries),
            feedback_service: Arc::new(feedback_service),
            report_service: Arc::new(report_service),
            config,
            data_dir,
            db_pool,
        })
    }
}
