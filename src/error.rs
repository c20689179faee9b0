use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure body returned to the sender: `{"success":false,"error":...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Errors raised while accepting a delivery, before the signature check.
///
/// Signature problems are not represented here: they are logged by the
/// handler and the delivery is still acknowledged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unsupported content type")]
    UnsupportedContentType,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// Every processing failure is reported to the sender as a 500.
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedContentType | ApiError::InvalidBody(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::UnsupportedContentType => "unsupported_content_type",
            ApiError::InvalidBody(_) => "invalid_body",
        }
    }

    /// Log error with appropriate level
    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error_type = self.error_type(),
                    error = %self,
                    "Error processing webhook"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error_type = self.error_type(),
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidBody(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();

        self.log_error(&request_id);

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_unsupported_content_type_response() {
        let response = ApiError::UnsupportedContentType.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.success);
        assert_eq!(body.error, "Unsupported content type");
    }

    #[tokio::test]
    async fn test_invalid_body_response() {
        let response = ApiError::InvalidBody("EOF while parsing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.success);
        assert_eq!(body.error, "Invalid request body: EOF while parsing");
    }

    #[test]
    fn test_json_error_converts_to_invalid_body() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let api_error = ApiError::from(err);
        assert!(matches!(api_error, ApiError::InvalidBody(_)));
        assert!(api_error.to_string().starts_with("Invalid request body"));
    }
}
