//! API routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{companies, health, users};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::liveness))
        .nest("/api/companies", companies_router())
}

fn companies_router() -> Router<AppState> {
    Router::new()
        .route("/list", post(companies::list_companies))
        .route("/:company_id", get(companies::get_company))
        .route("/:company_id/users/list", post(users::list_users))
}
