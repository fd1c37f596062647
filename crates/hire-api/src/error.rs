//! API error handling
//!
//! Failures leave the API as `{ "status": <code>, "message": <text> }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hire_core::HireError;
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    /// Listing endpoints report every service failure as a bad request.
    pub fn from_list_failure(err: HireError) -> Self {
        tracing::debug!(error_code = err.error_code(), error = %err, "List request failed");
        ApiError::BadRequest(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
        }
    }
}

impl From<HireError> for ApiError {
    fn from(err: HireError) -> Self {
        tracing::debug!(error_code = err.error_code(), error = %err, "Request failed");
        match err.status_code() {
            404 => ApiError::NotFound(err.to_string()),
            400 => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.message(), "Request failed");
        }

        let body = ErrorBody {
            status: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
