use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

/// Records request count and latency per normalized path
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Collapses user-supplied path segments (folder names, applet names) into
/// placeholders so label cardinality stays bounded.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let mut normalized = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        let parent = index.checked_sub(1).map(|i| segments[i]);
        let has_child = index + 1 < segments.len();

        match parent {
            Some("folders") => normalized.push("{folder}"),
            Some("applets") if has_child => normalized.push("{applet}"),
            _ => normalized.push(*segment),
        }
    }

    normalized.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/api/v1/study/selection/folders/4.1"),
            "/api/v1/study/selection/folders/{folder}"
        );
        assert_eq!(
            normalize_path("/api/v1/applets/flashcards/toggle"),
            "/api/v1/applets/{applet}/toggle"
        );
        assert_eq!(normalize_path("/api/v1/applets"), "/api/v1/applets");
        assert_eq!(
            normalize_path("/api/v1/study/session/answer"),
            "/api/v1/study/session/answer"
        );
        assert_eq!(normalize_path("/health"), "/health");
    }
}
