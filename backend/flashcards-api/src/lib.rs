use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::StudyError;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // The desktop front end is served from another origin during development
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1/study", study_routes())
        .route("/api/v1/applets", get(handlers::applets::list_applets))
        .route(
            "/api/v1/applets/{applet}/toggle",
            post(handlers::applets::toggle_applet),
        )
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn study_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(handlers::study::start_session))
        .route(
            "/session",
            get(handlers::study::get_session).delete(handlers::study::abandon_session),
        )
        .route("/session/flip", post(handlers::study::flip_card))
        .route("/session/previous", post(handlers::study::previous_card))
        .route("/session/answer", post(handlers::study::submit_answer))
        .route("/session/restart", post(handlers::study::restart_session))
        .route(
            "/selection",
            get(handlers::study::get_selection).delete(handlers::study::reset_selection),
        )
        .route(
            "/selection/category",
            post(handlers::study::select_category),
        )
        .route(
            "/selection/folders/{folder}",
            post(handlers::study::toggle_folder),
        )
}
