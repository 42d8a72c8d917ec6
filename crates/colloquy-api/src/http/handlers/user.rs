//! Account HTTP handlers.
//!
//! Endpoints:
//! - POST /api/users       - Sign up a member account
//! - POST /api/users/login - Exchange credentials for a bearer token

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use colloquy_types::user::User;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body for login. The plaintext token appears here and nowhere
/// else.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// POST /api/users - Register a member account.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user = state
        .user_service
        .sign_up(&req.email, &req.name, &req.password)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(user, request_id, elapsed)
        .with_link("login", "/api/users/login");

    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /api/users/login - Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state.user_service.login(&req.email, &req.password).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user: session.user,
        },
        request_id,
        elapsed,
    )
    .with_link("chats", "/api/chats");

    Ok(Json(resp))
}
