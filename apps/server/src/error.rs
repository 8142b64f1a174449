use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pulsefolio_core::errors::Error as CoreError;
use serde::Serialize;
use thiserror::Error;

pub const SNAPSHOT_FAILED_MESSAGE: &str = "Failed to load portfolio snapshot";
pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Too many requests")]
    TooManyRequests,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => {
                tracing::error!("Portfolio snapshot failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SNAPSHOT_FAILED_MESSAGE.to_string(),
                )
            }
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                TOO_MANY_REQUESTS_MESSAGE.to_string(),
            ),
        };
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_core_error_hides_details() {
        let response =
            ApiError::from(CoreError::HoldingsSource("disk on fire".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Failed to load portfolio snapshot" }));
    }

    #[tokio::test]
    async fn test_too_many_requests_envelope() {
        let response = ApiError::TooManyRequests.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Too many requests");
        assert!(body.get("data").is_none());
    }
}
