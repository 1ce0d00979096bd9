use crate::pages;
use crate::state::CallbackState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

pub fn callback_routes() -> Router<CallbackState> {
    Router::new()
        // Health
        .route("/ping", get(ping))
        // Login redirect
        .route("/auth", get(auth_callback))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn ping() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "pong" }))
}

// ---------------------------------------------------------------------------
// Login redirect
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AuthQuery {
    request_token: Option<String>,
}

async fn auth_callback(
    State(state): State<CallbackState>,
    Query(query): Query<AuthQuery>,
) -> impl IntoResponse {
    tracing::info!("Login redirect received");

    match query.request_token.filter(|token| !token.is_empty()) {
        Some(token) => {
            state.session.record_callback(token);
            (StatusCode::OK, Html(pages::success_page()))
        }
        None => {
            tracing::warn!("Login redirect without request_token");
            (StatusCode::BAD_REQUEST, Html(pages::failure_page()))
        }
    }
}
