use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::JobServiceError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Maps service failures onto HTTP. Store failures are logged and reported
/// with the generic `failure_message` only.
pub fn service_error_response(error: JobServiceError, failure_message: &str) -> Response {
    match error {
        JobServiceError::InvalidArgument(message) => {
            tracing::warn!(error = %message, "Rejected invalid request");
            error_response(StatusCode::BAD_REQUEST, message)
        }
        JobServiceError::NotFound(id) => {
            tracing::debug!(job_id = %id, "Download not found");
            error_response(StatusCode::NOT_FOUND, "Download not found")
        }
        JobServiceError::Repository(e) => {
            tracing::error!(error = %e, "{}", failure_message);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, failure_message)
        }
    }
}
