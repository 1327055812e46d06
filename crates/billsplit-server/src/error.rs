use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use billsplit_shared::ValidationError;
use billsplit_store::StoreError;

/// Failure of a single procedure call.
///
/// The response body never carries the detail: it is logged here and the
/// client only sees a generic message for the class of failure.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ServerError {
    fn from(err: ValidationError) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidReference(_) | StoreError::ImageLimit { .. } => {
                ServerError::BadRequest(err.to_string())
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(detail) => {
                tracing::warn!(%detail, "Rejected request");
                (StatusCode::BAD_REQUEST, "Invalid request")
            }
            ServerError::PayloadTooLarge(detail) => {
                tracing::warn!(%detail, "Rejected oversized request");
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            }
            ServerError::Internal(detail) => {
                tracing::error!(%detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
