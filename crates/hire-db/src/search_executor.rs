//! Search Executor
//!
//! Compiles a `SearchRequest` into a filter document and an aggregation
//! pipeline and runs both against a document store: a count over the filter
//! alone, then the pipeline for the page of rows.

use bson::Document;
use hire_search::{SearchRequest, SearchResults};
use tracing::debug;

use crate::pipeline::{sort_document, Projection, SearchPipeline};
use crate::repository::RepositoryResult;
use crate::store::DocumentStore;
use crate::translate;

/// Search executor over one collection
pub struct SearchExecutor<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    hidden_fields: &'a [String],
}

impl<'a, S: DocumentStore + ?Sized> SearchExecutor<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            hidden_fields: &[],
        }
    }

    /// Fields hidden from every result on top of `__v` and the request's excludes
    pub fn with_hidden_fields(mut self, fields: &'a [String]) -> Self {
        self.hidden_fields = fields;
        self
    }

    /// Execute a search and return the page plus the total match count.
    ///
    /// Either store call failing fails the whole search.
    pub async fn execute(&self, request: &SearchRequest) -> RepositoryResult<SearchResults<Document>> {
        let filter = translate::to_document(&request.predicate())?;

        let rows_count = self.store.count_documents(filter.clone()).await?;

        let pipeline = self.build_pipeline(request, filter);
        debug!(
            stages = ?pipeline.stages(),
            rows_count,
            "Executing search pipeline"
        );

        let rows = self.store.aggregate(pipeline.into_stages()).await?;

        Ok(SearchResults::new(rows_count, rows))
    }

    /// Count documents matching the request's filters, ignoring everything else
    pub async fn count(&self, request: &SearchRequest) -> RepositoryResult<u64> {
        let filter = translate::to_document(&request.predicate())?;
        self.store.count_documents(filter).await
    }

    /// Assemble the pipeline for a request whose filter is already translated
    pub fn build_pipeline(&self, request: &SearchRequest, filter: Document) -> SearchPipeline {
        let projection = Projection::new()
            .hide_all(self.hidden_fields.iter().cloned())
            .hide_all(request.exclude.iter().cloned());

        SearchPipeline::new(
            &projection,
            filter,
            sort_document(&request.sort_keys()),
            request.window(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::repository::RepositoryError;
    use crate::store::MockDocumentStore;
    use bson::doc;
    use hire_search::{FilterSpec, PaginationSpec};
    use mockall::predicate::eq;

    fn status_regex() -> Document {
        doc! { "status": { "$regex": "^active$", "$options": "i" } }
    }

    #[tokio::test]
    async fn test_execute_counts_then_aggregates() {
        let mut store = MockDocumentStore::new();
        let mut seq = mockall::Sequence::new();

        store
            .expect_count_documents()
            .with(eq(status_regex()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(42));
        store
            .expect_aggregate()
            .withf(|pipeline| {
                pipeline
                    == &vec![
                        doc! { "$project": { "__v": 0 } },
                        doc! { "$match": { "status": { "$regex": "^active$", "$options": "i" } } },
                        doc! { "$sort": { "createdAt": -1 } },
                        doc! { "$limit": 20_i64 },
                        doc! { "$skip": 10_i64 },
                    ]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![doc! { "name": "a" }]));

        let request = SearchRequest::builder()
            .equals("status", "active")
            .sort_desc("createdAt")
            .page(10, 2)
            .build();

        let results = SearchExecutor::new(&store).execute(&request).await.unwrap();
        assert_eq!(results.rows_count, 42);
        assert_eq!(results.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_request_projects_only() {
        let mut store = MockDocumentStore::new();
        store
            .expect_count_documents()
            .with(eq(Document::new()))
            .returning(|_| Ok(0));
        store
            .expect_aggregate()
            .with(eq(vec![doc! { "$project": { "__v": 0 } }]))
            .returning(|_| Ok(vec![]));

        let results = SearchExecutor::new(&store)
            .execute(&SearchRequest::new())
            .await
            .unwrap();
        assert_eq!(results.rows_count, 0);
        assert!(results.rows.is_empty());
    }

    #[tokio::test]
    async fn test_count_failure_skips_pipeline() {
        let mut store = MockDocumentStore::new();
        store
            .expect_count_documents()
            .returning(|_| Err(RepositoryError::Query("store unavailable".into())));
        store.expect_aggregate().never();

        let err = SearchExecutor::new(&store)
            .execute(&SearchRequest::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }

    #[tokio::test]
    async fn test_pipeline_failure_returns_no_partial_result() {
        let mut store = MockDocumentStore::new();
        store.expect_count_documents().returning(|_| Ok(5));
        store
            .expect_aggregate()
            .returning(|_| Err(RepositoryError::Query("bad stage".into())));

        let result = SearchExecutor::new(&store).execute(&SearchRequest::new()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_build_pipeline_merges_hidden_and_excluded() {
        let store = MockDocumentStore::new();
        let hidden = vec!["internalNotes".to_string()];
        let executor = SearchExecutor::new(&store).with_hidden_fields(&hidden);

        let request = SearchRequest::builder()
            .exclude("password")
            .pagination(PaginationSpec::default())
            .build();
        let pipeline = executor.build_pipeline(&request, Document::new());

        assert_eq!(
            pipeline.into_stages(),
            vec![doc! { "$project": { "__v": 0, "internalNotes": 0, "password": 0 } }]
        );
    }

    fn people() -> MemoryStore {
        MemoryStore::with_documents(vec![
            doc! { "name": "Ada", "status": "active", "age": 36, "__v": 0 },
            doc! { "name": "Grace", "status": "Active", "age": 45, "__v": 0 },
            doc! { "name": "Linus", "status": "inactive", "age": 28, "__v": 0 },
            doc! { "name": "Barbara", "status": "ACTIVE", "age": 52, "__v": 0 },
        ])
    }

    #[tokio::test]
    async fn test_rows_count_matches_independent_count() {
        let store = people();
        let request = SearchRequest::builder().equals("status", "active").build();

        let results = SearchExecutor::new(&store).execute(&request).await.unwrap();
        let filter = translate::to_document(&request.predicate()).unwrap();
        let independent = store.count_documents(filter).await.unwrap();

        assert_eq!(results.rows_count, 3);
        assert_eq!(results.rows_count, independent);
    }

    #[tokio::test]
    async fn test_empty_request_returns_everything() {
        let store = people();
        let results = SearchExecutor::new(&store)
            .execute(&SearchRequest::new())
            .await
            .unwrap();

        assert_eq!(results.rows_count, 4);
        assert_eq!(results.rows.len(), 4);
        assert!(results.rows.iter().all(|row| !row.contains_key("__v")));
    }

    #[tokio::test]
    async fn test_second_page_with_sort() {
        let store = people();
        let request = SearchRequest::builder().sort_asc("age").page(2, 2).build();

        let results = SearchExecutor::new(&store).execute(&request).await.unwrap();
        let names: Vec<_> = results
            .rows
            .iter()
            .map(|row| row.get_str("name").unwrap().to_string())
            .collect();

        assert_eq!(results.rows_count, 4);
        assert_eq!(names, vec!["Grace", "Barbara"]);
    }

    #[tokio::test]
    async fn test_or_group() {
        let store = people();
        let request = SearchRequest::builder()
            .filter(FilterSpec::starts_with("name", "ad").or())
            .filter(FilterSpec::starts_with("name", "li").or())
            .sort_asc("name")
            .build();

        let results = SearchExecutor::new(&store).execute(&request).await.unwrap();
        assert_eq!(results.rows_count, 2);
        assert_eq!(results.rows[0].get_str("name").unwrap(), "Ada");
        assert_eq!(results.rows[1].get_str("name").unwrap(), "Linus");
    }

    #[tokio::test]
    async fn test_negative_page_surfaces_store_error() {
        let store = people();
        let request = SearchRequest::builder().page(10, -1).build();

        let err = SearchExecutor::new(&store).execute(&request).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }
}
