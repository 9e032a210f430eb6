#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use flashcards_api::{
    config::Config,
    create_router,
    models::Card,
    services::{card_source::StaticCardSource, AppState},
};

pub fn create_test_app() -> Router {
    create_test_app_with(math_pool())
}

pub fn create_test_app_with(cards: Vec<Card>) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let source = StaticCardSource::new()
        .with_category("Math", cards)
        .with_category("Physics", Vec::new());

    let app_state = Arc::new(AppState::with_source(Config::default(), Arc::new(source)));
    create_router(app_state)
}

/// One flip card plus a three step multiple choice chain.
pub fn math_pool() -> Vec<Card> {
    vec![
        Card::new("def-sine", "Define sine").with_back("opposite / hypotenuse"),
        Card::new("rad-30", "Convert 30° to radians")
            .with_options(["π/6", "π/3", "π/4"])
            .with_next("cos-30")
            .with_step(1, 3),
        Card::new("cos-30", "What is cos(30°)?")
            .with_options(["√3/2", "1/2"])
            .with_next("sin-30")
            .never_first()
            .with_step(2, 3),
        Card::new("sin-30", "What is sin(30°)?")
            .with_options(["1/2", "√3/2"])
            .never_first()
            .with_step(3, 3),
    ]
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, json)
}
