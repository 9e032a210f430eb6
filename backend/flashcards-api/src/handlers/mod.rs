use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::services::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_active = state.study.lock().await.is_some();

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "flashcards-api",
            "version": env!("CARGO_PKG_VERSION"),
            "card_source": state.builder.source_name(),
            "session_active": session_active,
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

pub mod applets;
pub mod study;
