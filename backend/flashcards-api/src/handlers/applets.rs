use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{models::applet::Applet, services::AppState};

async fn flashcard_lives(state: &AppState) -> Option<(u32, u32)> {
    state.study.lock().await.as_ref().map(|session| {
        let progress = session.progress();
        (progress.lives_remaining, progress.starting_lives)
    })
}

pub async fn list_applets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let lives = flashcard_lives(&state).await;
    let applets = state.applets.lock().await.describe(lives);
    Json(applets)
}

pub async fn toggle_applet(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let applet: Applet = name.parse().map_err(|e: String| {
        tracing::warn!("{}", e);
        (StatusCode::NOT_FOUND, e)
    })?;

    let visible = state.applets.lock().await.toggle(applet);
    Ok(Json(json!({
        "applet": applet,
        "visible": visible,
    })))
}
