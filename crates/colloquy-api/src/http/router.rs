//! Axum router configuration with middleware.
//!
//! All routes are under `/api/`. Middleware: CORS, tracing.

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Accounts
        .route("/users", post(handlers::user::signup))
        .route("/users/login", post(handlers::user::login))
        // Conversational turns
        .route(
            "/chats",
            post(handlers::chat::create_chat).get(handlers::chat::list_chats),
        )
        // Threads
        .route("/threads/{id}", delete(handlers::thread::delete_thread))
        // Feedback
        .route(
            "/feedbacks",
            post(handlers::feedback::submit_feedback).get(handlers::feedback::list_feedback),
        )
        .route(
            "/feedbacks/{id}/status",
            patch(handlers::feedback::update_status),
        )
        // Admin reports
        .route("/reports/activity", get(handlers::report::activity))
        .route("/reports/chats.csv", get(handlers::report::chats_csv));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
