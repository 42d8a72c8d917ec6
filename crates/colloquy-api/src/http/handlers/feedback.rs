//! Feedback HTTP handlers.
//!
//! Endpoints:
//! - POST  /api/feedbacks              - Leave a verdict on a chat turn
//! - GET   /api/feedbacks              - List feedback (own, or all for admins)
//! - PATCH /api/feedbacks/{id}/status  - Triage a feedback entry (admin)

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use colloquy_types::chat::ChatId;
use colloquy_types::feedback::{Feedback, FeedbackId, FeedbackStatus};

use crate::http::error::AppError;
use crate::http::extractors::auth::{AdminOnly, Authenticated};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for submitting feedback.
#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub chat_id: String,
    pub is_positive: bool,
}

/// Request body for the triage status update.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: FeedbackStatus,
}

/// Query parameters for feedback listing.
#[derive(Debug, Deserialize, Default)]
pub struct FeedbackListQuery {
    pub is_positive: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// One page of feedback plus the total for paging metadata.
#[derive(Debug, Serialize)]
pub struct FeedbackPage {
    pub items: Vec<Feedback>,
    pub total: u64,
}

/// POST /api/feedbacks - Leave a thumbs-up/down verdict on a chat turn.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(req): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Feedback>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chat_id: ChatId = req
        .chat_id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid chat id: {}", req.chat_id)))?;

    let feedback = state
        .feedback_service
        .submit(&user, &chat_id, req.is_positive)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(feedback, request_id, elapsed)
        .with_link("self", "/api/feedbacks");

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/feedbacks - Feedback newest first, optionally filtered by
/// verdict. Members see their own; admins see everyone's.
pub async fn list_feedback(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Query(query): Query<FeedbackListQuery>,
) -> Result<Json<ApiResponse<FeedbackPage>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let page = colloquy_core::store::Page::new(query.limit, query.offset);

    let (items, total) = if user.is_admin() {
        state
            .feedback_service
            .list_all(query.is_positive, &page)
            .await?
    } else {
        state
            .feedback_service
            .list_for_user(&user.id, query.is_positive, &page)
            .await?
    };

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(FeedbackPage { items, total }, request_id, elapsed)
        .with_link("self", "/api/feedbacks");

    Ok(Json(resp))
}

/// PATCH /api/feedbacks/{id}/status - Replace the triage status.
pub async fn update_status(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Feedback>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let feedback_id: FeedbackId = id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid feedback id: {id}")))?;

    let feedback = state
        .feedback_service
        .update_status(&feedback_id, req.status)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(feedback, request_id, elapsed);

    Ok(Json(resp))
}
