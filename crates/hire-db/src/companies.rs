//! Company repository

use std::sync::Arc;

use bson::{doc, Bson, Document};
use hire_search::{DocumentId, SearchRequest, SearchResults};

use crate::repository::{object_id, EntityRepository, RepositoryResult};
use crate::store::DocumentStore;

pub const COLLECTION: &str = "companies";

/// Company repository
#[derive(Clone)]
pub struct CompanyRepository {
    inner: EntityRepository,
}

impl CompanyRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: EntityRepository::new("Company", store),
        }
    }

    pub fn with_hidden_fields(mut self, fields: Vec<String>) -> Self {
        self.inner = self.inner.with_hidden_fields(fields);
        self
    }

    pub async fn search(&self, request: &SearchRequest) -> RepositoryResult<SearchResults<Document>> {
        self.inner.search(request).await
    }

    pub async fn search_count(&self, request: &SearchRequest) -> RepositoryResult<u64> {
        self.inner.search_count(request).await
    }

    pub async fn gets(&self) -> RepositoryResult<Vec<Document>> {
        self.inner.gets().await
    }

    pub async fn get(&self, id: &DocumentId) -> RepositoryResult<Document> {
        self.inner.get(id, &[]).await
    }

    pub async fn is_exist(&self, id: &DocumentId) -> RepositoryResult<bool> {
        self.inner.exists(doc! { "_id": object_id(id)? }).await
    }

    pub async fn is_exist_by_name(&self, name: &str) -> RepositoryResult<bool> {
        self.inner.exists(doc! { "name": name }).await
    }

    pub async fn create(&self, company: Document) -> RepositoryResult<Bson> {
        self.inner.create(company).await
    }

    pub async fn update(&self, id: &DocumentId, changes: Document) -> RepositoryResult<()> {
        self.inner.update(id, changes).await
    }

    pub async fn soft_delete(&self, id: &DocumentId) -> RepositoryResult<()> {
        self.inner.soft_delete(id).await
    }
}
