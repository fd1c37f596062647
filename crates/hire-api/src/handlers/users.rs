//! User API handlers

use axum::extract::{Path, State};
use hire_search::SearchResults;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, SearchBody};
use crate::representers::{document_to_json, Envelope};

/// POST /api/companies/:company_id/users/list
pub async fn list_users(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    SearchBody(request): SearchBody,
) -> ApiResult<Envelope<SearchResults<Value>>> {
    let results = state
        .users
        .get_users(&company_id, request)
        .await
        .map_err(ApiError::from_list_failure)?;

    Ok(Envelope::ok(
        "Users retrieved successfully",
        results.map(document_to_json),
    ))
}
