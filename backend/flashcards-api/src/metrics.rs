use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Card source Metrics
    pub static ref CARD_FETCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "card_fetch_total",
        "Total number of card pool fetches",
        &["source", "status"]
    )
    .unwrap();

    pub static ref CARD_FETCH_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "card_fetch_duration_seconds",
        "Card pool fetch duration in seconds",
        &["source"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();

    // Study Metrics
    pub static ref SESSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "study_sessions_total",
        "Study session lifecycle events",
        &["status"]
    )
    .unwrap();

    pub static ref ANSWERS_RECORDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_recorded_total",
        "Total number of answers recorded",
        &["correct"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}
