//! User services

use bson::Document;
use hire_core::{HireError, HireResult};
use hire_db::UserRepository;
use hire_search::{DocumentId, FilterOperator, FilterSpec, SearchRequest, SearchResults};
use tracing::debug;

/// Field tying a user to their company
pub const COMPANY_FIELD: &str = "companyId";

/// Fields never returned by user listings
pub const DEFAULT_EXCLUDED_FIELDS: [&str; 2] = ["__v", "password"];

/// User service
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    excluded_fields: Vec<String>,
}

impl UserService {
    pub fn new(users: UserRepository) -> Self {
        Self {
            users,
            excluded_fields: DEFAULT_EXCLUDED_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Replace the fields stripped from every listed user
    pub fn with_excluded_fields(mut self, fields: Vec<String>) -> Self {
        self.excluded_fields = fields;
        self
    }

    /// Search the users of one company.
    ///
    /// A `companyId` filter is added unless the caller already sent one, and
    /// the request's excludes are replaced with the service's own list.
    pub async fn get_users(
        &self,
        company_id: &str,
        mut request: SearchRequest,
    ) -> HireResult<SearchResults<Document>> {
        let company_id = DocumentId::parse(company_id)
            .ok_or_else(|| HireError::bad_request(format!("invalid company id: {}", company_id)))?;

        scope_to_company(&mut request, company_id);
        request.exclude = self.excluded_fields.clone();

        debug!(
            filters = request.filter.len(),
            sorts = request.sort.len(),
            paginated = request.window().is_some(),
            "Listing users"
        );

        Ok(self.users.search(&request).await?)
    }
}

/// Scope a request to one company.
///
/// The company filter is appended when the request lacks one. Once the
/// request has AND or OR filters, combinator-less filters are dropped by the
/// compiler, so the appended filter joins the AND group and any
/// combinator-less `companyId` filter the caller sent is promoted to it.
fn scope_to_company(request: &mut SearchRequest, company_id: DocumentId) {
    let grouped = request
        .filter
        .iter()
        .any(|f| f.operator != FilterOperator::None);

    if request.has_filter_for(COMPANY_FIELD) {
        if grouped {
            for filter in request.filter.iter_mut().filter(|f| f.name == COMPANY_FIELD) {
                if filter.operator == FilterOperator::None {
                    filter.operator = FilterOperator::And;
                }
            }
        }
        return;
    }

    let filter = FilterSpec::equals(COMPANY_FIELD, company_id);
    request
        .filter
        .push(if grouped { filter.and() } else { filter });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bson::doc;
    use bson::oid::ObjectId;
    use hire_db::MemoryStore;

    const ACME: &str = "65f1c0ffee0000000000ac3e";
    const GLOBEX: &str = "65f1c0ffee00000000000b0b";

    fn service() -> UserService {
        let acme = ObjectId::parse_str(ACME).unwrap();
        let globex = ObjectId::parse_str(GLOBEX).unwrap();
        let store = MemoryStore::with_documents(vec![
            doc! { "name": "Ada", "companyId": acme, "password": "h1", "__v": 0 },
            doc! { "name": "Grace", "companyId": acme, "password": "h2", "__v": 0 },
            doc! { "name": "Alan", "companyId": globex, "password": "h3", "__v": 0 },
        ]);
        UserService::new(UserRepository::new(Arc::new(store)))
    }

    #[test]
    fn test_scope_adds_plain_filter() {
        let mut request = SearchRequest::builder().contains("name", "a").build();
        scope_to_company(&mut request, DocumentId::parse(ACME).unwrap());

        assert_eq!(request.filter.len(), 2);
        assert_eq!(request.filter[1].name, COMPANY_FIELD);
        assert_eq!(request.filter[1].operator, FilterOperator::None);
    }

    #[test]
    fn test_scope_joins_and_group_when_grouped() {
        let mut request = SearchRequest::builder()
            .filter(FilterSpec::contains("name", "a").or())
            .build();
        scope_to_company(&mut request, DocumentId::parse(ACME).unwrap());

        assert_eq!(request.filter[1].operator, FilterOperator::And);
    }

    #[test]
    fn test_scope_keeps_existing_company_filter() {
        let mut request = SearchRequest::builder().equals(COMPANY_FIELD, GLOBEX).build();
        scope_to_company(&mut request, DocumentId::parse(ACME).unwrap());

        assert_eq!(request.filter.len(), 1);
    }

    #[tokio::test]
    async fn test_get_users_scopes_and_hides_password() {
        let results = service()
            .get_users(ACME, SearchRequest::builder().sort_asc("name").build())
            .await
            .unwrap();

        assert_eq!(results.rows_count, 2);
        assert_eq!(results.rows[0].get_str("name").unwrap(), "Ada");
        for row in &results.rows {
            assert!(!row.contains_key("password"));
            assert!(!row.contains_key("__v"));
        }
    }

    #[tokio::test]
    async fn test_get_users_with_or_filters_stays_scoped() {
        let request = SearchRequest::builder()
            .filter(FilterSpec::starts_with("name", "a").or())
            .filter(FilterSpec::starts_with("name", "g").or())
            .build();

        let results = service().get_users(ACME, request).await.unwrap();
        assert_eq!(results.rows_count, 2);
        assert!(results.rows.iter().all(|r| r.get_str("name").unwrap() != "Alan"));
    }

    #[test]
    fn test_scope_promotes_caller_company_filter_when_grouped() {
        let mut request = SearchRequest::builder()
            .equals(COMPANY_FIELD, ACME)
            .filter(FilterSpec::starts_with("name", "a").or())
            .build();
        scope_to_company(&mut request, DocumentId::parse(ACME).unwrap());

        assert_eq!(request.filter.len(), 2);
        assert_eq!(request.filter[0].operator, FilterOperator::And);
        assert_eq!(request.filter[1].operator, FilterOperator::Or);
    }

    #[tokio::test]
    async fn test_caller_company_filter_with_or_filter_stays_scoped() {
        let request = SearchRequest::builder()
            .equals(COMPANY_FIELD, ACME)
            .filter(FilterSpec::starts_with("name", "a").or())
            .build();

        let results = service().get_users(ACME, request).await.unwrap();
        assert_eq!(results.rows_count, 1);
        assert_eq!(results.rows[0].get_str("name").unwrap(), "Ada");
    }

    #[tokio::test]
    async fn test_get_users_rejects_bad_company_id() {
        let err = service()
            .get_users("not-an-id", SearchRequest::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
