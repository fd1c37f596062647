//! Axum extractors and shared state for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use hire_core::config::SearchConfig;
use hire_db::{CompanyRepository, DocumentStore, UserRepository};
use hire_search::SearchRequest;
use hire_services::{CompanyService, UserService};

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub companies: CompanyService,
}

impl AppState {
    pub fn new(users: UserService, companies: CompanyService) -> Self {
        Self { users, companies }
    }

    /// Wire repositories and services over the given stores
    pub fn from_stores(
        users: Arc<dyn DocumentStore>,
        companies: Arc<dyn DocumentStore>,
        search: &SearchConfig,
    ) -> Self {
        let users = UserRepository::new(users).with_hidden_fields(search.hidden_fields.clone());
        let companies =
            CompanyRepository::new(companies).with_hidden_fields(search.hidden_fields.clone());

        Self {
            users: UserService::new(users).with_excluded_fields(search.user_excluded_fields.clone()),
            companies: CompanyService::new(companies),
        }
    }
}

/// JSON search body.
///
/// Malformed bodies are rejected with the API's own error envelope instead
/// of axum's plain-text rejection.
pub struct SearchBody(pub SearchRequest);

#[async_trait]
impl<S> FromRequest<S> for SearchBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(request) = Json::<SearchRequest>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(SearchBody(request))
    }
}
