//! Success envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// `{ "status": 200, "message": ..., "Results": ... }`
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: u16,
    pub message: String,
    #[serde(rename = "Results")]
    pub results: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, results: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            results,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
