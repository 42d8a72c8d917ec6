//! Thread HTTP handlers.
//!
//! Endpoints:
//! - DELETE /api/threads/{id} - Delete a thread and its turns

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use colloquy_types::thread::ThreadId;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// DELETE /api/threads/{id} - Delete a thread and its turns. Members may
/// delete only their own threads; admins may delete any.
pub async fn delete_thread(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let thread_id: ThreadId = id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid thread id: {id}")))?;

    state.chat_queries.delete_thread(&user, &thread_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({"deleted": true, "thread_id": thread_id}),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}
