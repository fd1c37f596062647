//! User repository
//!
//! Document operations for the `users` collection.

use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use hire_search::{DocumentId, SearchRequest, SearchResults, TextPattern};

use crate::pipeline::VERSION_FIELD;
use crate::repository::{object_id, EntityRepository, RepositoryResult};
use crate::store::DocumentStore;
use crate::translate::pattern_source;

pub const COLLECTION: &str = "users";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    inner: EntityRepository,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: EntityRepository::new("User", store),
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

    pub async fn get(&self, id: &DocumentId, exclude: &[String]) -> RepositoryResult<Document> {
        self.inner.get(id, exclude).await
    }

    /// Case-insensitive lookup by email address
    pub async fn get_by_email(&self, email: &str) -> RepositoryResult<Option<Document>> {
        let filter = doc! {
            "email": { "$regex": pattern_source(&TextPattern::exact(email)), "$options": "i" }
        };
        let mut found = self
            .inner
            .store()
            .find(filter, Some(doc! { VERSION_FIELD: 0 }))
            .await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    /// Check whether any user has this email
    pub async fn is_exist(&self, email: &str) -> RepositoryResult<bool> {
        self.inner.exists(doc! { "email": email }).await
    }

    /// Check whether a company already has a user with this email
    pub async fn is_exist_for_company(
        &self,
        company_id: &DocumentId,
        email: &str,
    ) -> RepositoryResult<bool> {
        let company: ObjectId = object_id(company_id)?;
        self.inner
            .exists(doc! { "companyId": company, "email": email })
            .await
    }

    pub async fn create(&self, user: Document) -> RepositoryResult<Bson> {
        self.inner.create(user).await
    }

    pub async fn update(&self, id: &DocumentId, changes: Document) -> RepositoryResult<()> {
        self.inner.update(id, changes).await
    }

    pub async fn soft_delete(&self, id: &DocumentId) -> RepositoryResult<()> {
        self.inner.soft_delete(id).await
    }
}
