//! Conversational turn HTTP handlers.
//!
//! Endpoints:
//! - POST /api/chats - Run one question/answer turn
//! - GET  /api/chats - List threads with their turns (own, or all for admins)

use std::time::Instant;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use colloquy_core::chat::orchestrator::CreateChat;
use colloquy_core::chat::queries::ThreadPage;
use colloquy_types::chat::Chat;
use colloquy_types::thread::ThreadId;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::PageQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a conversational turn.
#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub question: String,
    /// Overrides the configured model when present.
    pub model: Option<String>,
    /// Recorded; the transport always delivers a complete answer.
    #[serde(default)]
    pub streaming: bool,
}

/// Response body for a completed turn.
///
/// A degraded turn (provider failure absorbed into the answer text) is
/// still a 200; `provider_degraded` flags it.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub chat: Chat,
    pub thread_id: ThreadId,
    pub opened_new_thread: bool,
    pub provider_degraded: bool,
}

/// POST /api/chats - Run one question/answer turn.
pub async fn create_chat(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(req): Json<CreateChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let outcome = state
        .orchestrator
        .create_chat(CreateChat {
            user_id: user.id,
            question: req.question,
            model: req.model,
            streaming_requested: req.streaming,
        })
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        ChatResponse {
            thread_id: outcome.thread.id.clone(),
            chat: outcome.chat,
            opened_new_thread: outcome.opened_new_thread,
            provider_degraded: outcome.provider_degraded,
        },
        request_id,
        elapsed,
    )
    .with_link("self", "/api/chats");

    Ok(Json(resp))
}

/// GET /api/chats - Page of threads, newest activity first, each with its
/// turns. Members see their own threads; admins see everyone's.
pub async fn list_chats(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<ThreadPage>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let page = query.page();

    let threads = if user.is_admin() {
        state.chat_queries.all_threads(&page).await?
    } else {
        state.chat_queries.threads_for_user(&user.id, &page).await?
    };

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(threads, request_id, elapsed).with_link("self", "/api/chats");

    Ok(Json(resp))
}
