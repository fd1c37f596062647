//! Liveness handler

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
