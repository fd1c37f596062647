//! Core error types for Hire RS
//!
//! Every layer converts its own failures into `HireError` before they reach
//! the HTTP boundary.

use thiserror::Error;

/// Core error type for all Hire RS operations
#[derive(Error, Debug)]
pub enum HireError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HireError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        HireError::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HireError::BadRequest {
            message: message.into(),
        }
    }
}

/// HTTP status code mapping for errors
impl HireError {
    pub fn status_code(&self) -> u16 {
        match self {
            HireError::NotFound { .. } => 404,
            HireError::BadRequest { .. } => 400,
            HireError::Query(_) => 400,
            HireError::Database(_) | HireError::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            HireError::NotFound { .. } => "not_found",
            HireError::BadRequest { .. } => "bad_request",
            HireError::Query(_) => "query_failed",
            HireError::Database(_) => "database_error",
            HireError::Internal(_) => "internal_error",
        }
    }
}
