//! Admin reporting HTTP handlers.
//!
//! Endpoints:
//! - GET /api/reports/activity  - Trailing-24h activity counters
//! - GET /api/reports/chats.csv - CSV export of chat turns in a window

use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use colloquy_core::report::ActivityStats;

use crate::http::error::AppError;
use crate::http::extractors::auth::AdminOnly;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for the CSV export window `[from, to)`.
///
/// Defaults to the trailing 24 hours when omitted.
#[derive(Debug, Deserialize, Default)]
pub struct CsvExportQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// GET /api/reports/activity - Signups, logins, and chat turns over the
/// trailing 24 hours.
pub async fn activity(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
) -> Result<Json<ApiResponse<ActivityStats>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let stats = state.report_service.activity_stats(Utc::now()).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(stats, request_id, elapsed)
        .with_link("self", "/api/reports/activity")
        .with_link("csv", "/api/reports/chats.csv");

    Ok(Json(resp))
}

/// GET /api/reports/chats.csv - Chat turns in `[from, to)` as a CSV
/// attachment. This endpoint bypasses the JSON envelope.
pub async fn chats_csv(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Query(query): Query<CsvExportQuery>,
) -> Result<Response, AppError> {
    let to = query.to.unwrap_or_else(Utc::now);
    let from = query.from.unwrap_or_else(|| to - Duration::hours(24));

    if from >= to {
        return Err(AppError::Validation(
            "'from' must be earlier than 'to'".to_string(),
        ));
    }

    let csv = state.report_service.chats_csv(from, to).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"chats.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
