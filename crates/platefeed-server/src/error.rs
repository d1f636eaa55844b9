use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use platefeed_store::StoreError;
use thiserror::Error;

/// Request-boundary error taxonomy.
///
/// Every handler failure is mapped to one of these and rendered as
/// `{"message": ..., "success": false}` with the matching status code.
/// Session failures never reveal whether a token was expired or tampered.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired session.
    #[error("Unauthorized")]
    Unauthorized,

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A unique field (email) is already taken.
    #[error("{0}")]
    Conflict(String),

    /// The media CDN or the store was unavailable.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Anything unexpected.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            // The original API reports duplicate registrations as 400.
            ApiError::Conflict(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Upstream(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Upstream error".to_string())
            }
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "message": message,
            "success": false,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Record not found".to_string()),
            StoreError::Conflict => ApiError::Conflict("Record already exists".to_string()),
            StoreError::Busy => ApiError::Upstream("storage busy".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
