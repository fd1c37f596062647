//! Company services

use bson::Document;
use hire_core::{HireError, HireResult};
use hire_db::CompanyRepository;
use hire_search::{DocumentId, SearchRequest, SearchResults};
use tracing::debug;

/// Company service
#[derive(Clone)]
pub struct CompanyService {
    companies: CompanyRepository,
}

impl CompanyService {
    pub fn new(companies: CompanyRepository) -> Self {
        Self { companies }
    }

    /// Search companies
    pub async fn get_companies(&self, request: SearchRequest) -> HireResult<SearchResults<Document>> {
        debug!(
            filters = request.filter.len(),
            sorts = request.sort.len(),
            paginated = request.window().is_some(),
            "Listing companies"
        );

        Ok(self.companies.search(&request).await?)
    }

    pub async fn get_company(&self, id: &str) -> HireResult<Document> {
        let id = DocumentId::parse(id)
            .ok_or_else(|| HireError::bad_request(format!("invalid company id: {}", id)))?;
        Ok(self.companies.get(&id).await?)
    }
}
