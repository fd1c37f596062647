//! Document store abstraction
//!
//! The search layer only ever hands the store a filter document, a
//! projection, a pipeline of stages and plain update documents. Any engine
//! that understands those can back a repository.

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::repository::RepositoryResult;

/// A single collection in a document store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find documents matching `filter`, optionally projected
    async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> RepositoryResult<Vec<Document>>;

    /// Run an aggregation pipeline
    async fn aggregate(&self, pipeline: Vec<Document>) -> RepositoryResult<Vec<Document>>;

    /// Count documents matching `filter`
    async fn count_documents(&self, filter: Document) -> RepositoryResult<u64>;

    /// Insert a document, returning its `_id`
    async fn insert_one(&self, document: Document) -> RepositoryResult<Bson>;

    /// Apply `update` to the first document matching `filter`, returning the
    /// number of matched documents
    async fn update_one(&self, filter: Document, update: Document) -> RepositoryResult<u64>;
}
