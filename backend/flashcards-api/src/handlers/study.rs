use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    error::StudyError,
    extractors::ValidJson,
    metrics::SESSIONS_TOTAL,
    models::study::{Answer, AnswerResponse, SelectCategoryRequest, StartSessionRequest},
    services::AppState,
};

type HandlerError = (StatusCode, String);

fn study_error(err: StudyError) -> HandlerError {
    if err.is_fetch_error() {
        tracing::error!("Study request failed: {}", err);
    } else {
        tracing::warn!("Study request rejected: {}", err);
    }
    err.into()
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<StartSessionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let (category, folders) = match req.category {
        Some(category) => (category, req.folders.unwrap_or_default()),
        None => state.selection.lock().await.confirmed().map_err(study_error)?,
    };

    tracing::info!(
        "Starting study session: category={}, folders={:?}",
        category,
        folders
    );

    let session = state
        .builder
        .start_session(&category, &folders)
        .await
        .map_err(study_error)?;

    let view = session.view();
    let replaced = state.study.lock().await.replace(session);
    if let Some(previous) = replaced {
        tracing::info!("Replacing study session {}", previous.id());
        SESSIONS_TOTAL.with_label_values(&["abandoned"]).inc();
    }

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let guard = state.study.lock().await;
    let session = guard
        .as_ref()
        .ok_or(StudyError::NoActiveSession)
        .map_err(study_error)?;

    Ok(Json(session.view()))
}

pub async fn flip_card(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut guard = state.study.lock().await;
    let session = guard
        .as_mut()
        .ok_or(StudyError::NoActiveSession)
        .map_err(study_error)?;

    session.flip().map_err(study_error)?;
    Ok(Json(session.view()))
}

pub async fn previous_card(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut guard = state.study.lock().await;
    let session = guard
        .as_mut()
        .ok_or(StudyError::NoActiveSession)
        .map_err(study_error)?;

    session.previous();
    Ok(Json(session.view()))
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Json(answer): Json<Answer>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut guard = state.study.lock().await;
    let session = guard
        .as_mut()
        .ok_or(StudyError::NoActiveSession)
        .map_err(study_error)?;

    let outcome = session.answer(answer).map_err(study_error)?;
    tracing::info!(
        "Answer processed: session={}, card={}, correct={}",
        session.id(),
        outcome.card_id,
        outcome.correct
    );

    Ok(Json(AnswerResponse {
        outcome,
        session: session.view(),
    }))
}

pub async fn restart_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut guard = state.study.lock().await;
    let session = guard
        .as_mut()
        .ok_or(StudyError::NoActiveSession)
        .map_err(study_error)?;

    session.restart();
    Ok(Json(session.view()))
}

pub async fn abandon_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let session = state
        .study
        .lock()
        .await
        .take()
        .ok_or(StudyError::NoActiveSession)
        .map_err(study_error)?;

    tracing::info!("Study session {} abandoned", session.id());
    SESSIONS_TOTAL.with_label_values(&["abandoned"]).inc();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_selection(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.selection.lock().await.clone())
}

pub async fn select_category(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SelectCategoryRequest>,
) -> impl IntoResponse {
    let mut selection = state.selection.lock().await;
    selection.select_category(req.category);
    Json(selection.clone())
}

pub async fn toggle_folder(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut selection = state.selection.lock().await;
    if selection.category.is_none() {
        return Err(study_error(StudyError::NoCategorySelected));
    }

    let selected = selection.toggle_folder(&folder);
    tracing::debug!("Folder {} selected={}", folder, selected);
    Ok(Json(selection.clone()))
}

pub async fn reset_selection(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.selection.lock().await.reset();
    StatusCode::NO_CONTENT
}
