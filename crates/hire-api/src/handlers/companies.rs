//! Company API handlers

use axum::extract::{Path, State};
use hire_search::SearchResults;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, SearchBody};
use crate::representers::{document_to_json, Envelope};

/// POST /api/companies/list
pub async fn list_companies(
    State(state): State<AppState>,
    SearchBody(request): SearchBody,
) -> ApiResult<Envelope<SearchResults<Value>>> {
    let results = state
        .companies
        .get_companies(request)
        .await
        .map_err(ApiError::from_list_failure)?;

    Ok(Envelope::ok(
        "Companies retrieved successfully",
        results.map(document_to_json),
    ))
}

/// GET /api/companies/:company_id
pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> ApiResult<Envelope<Value>> {
    let company = state.companies.get_company(&company_id).await?;
    Ok(Envelope::ok(
        "Company retrieved successfully",
        document_to_json(company),
    ))
}
