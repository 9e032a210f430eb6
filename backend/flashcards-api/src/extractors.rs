use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::Validate;

/// JSON body extractor that also runs `validator` rules and answers with a
/// JSON error body on either failure.
pub struct ValidJson<T>(pub T);

fn reject(message: String) -> Response {
    tracing::warn!("{}", message);
    let error_response = json!({
        "message": message,
        "status": 400
    });
    (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
}

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: serde::de::DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| reject(format!("Failed to parse JSON request body: {}", rejection)))?;

        value
            .validate()
            .map_err(|e| reject(format!("Invalid request: {}", e)))?;

        Ok(ValidJson(value))
    }
}
