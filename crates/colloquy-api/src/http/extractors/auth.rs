//! Bearer-token authentication extractors.
//!
//! Extracts the token from `Authorization: Bearer <token>` and resolves it
//! to a user through `UserService::authenticate`. Only the SHA-256 digest
//! of a token is ever stored, so the lookup hashes before comparing.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;

use colloquy_types::error::UserError;
use colloquy_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated request. Extracting this resolves the bearer token to
/// its account.
pub struct Authenticated(pub User);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let user = state
            .user_service
            .authenticate(&token, Utc::now())
            .await
            .map_err(|e| match e {
                UserError::Unauthorized => AppError::Unauthorized(
                    "Invalid or expired token. Provide a valid token via 'Authorization: Bearer <token>'."
                        .to_string(),
                ),
                other => AppError::User(other),
            })?;

        Ok(Authenticated(user))
    }
}

/// Authenticated admin request. Non-admin tokens are rejected with 403.
pub struct AdminOnly(pub User);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(user) = Authenticated::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::AccessDenied);
        }
        Ok(AdminOnly(user))
    }
}

/// Extract the bearer token from request headers.
fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    let auth = parts.headers.get("authorization").ok_or_else(|| {
        AppError::Unauthorized(
            "Missing token. Provide via 'Authorization: Bearer <token>' header.".to_string(),
        )
    })?;

    let auth_str = auth
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized(
                "Malformed Authorization header; expected 'Bearer <token>'.".to_string(),
            )
        })
}
