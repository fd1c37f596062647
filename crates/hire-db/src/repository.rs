//! Repository error types and the shared entity repository
//!
//! `EntityRepository` carries the operations every searchable collection
//! supports. The per-entity repositories wrap it and add their own lookups.

use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use hire_core::HireError;
use hire_search::{DocumentId, SearchRequest, SearchResults};

use crate::pipeline::VERSION_FIELD;
use crate::search_executor::SearchExecutor;
use crate::store::DocumentStore;

/// `recordStatus` value marking a soft-deleted document
pub const RECORD_STATUS_DELETED: i32 = 3;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid document id: {0}")]
    InvalidId(String),
}

impl From<bson::ser::Error> for RepositoryError {
    fn from(err: bson::ser::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for RepositoryError {
    fn from(err: bson::de::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

impl From<RepositoryError> for HireError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => HireError::not_found(entity, "_id", id),
            RepositoryError::Database(e) => HireError::Database(e.to_string()),
            RepositoryError::Query(msg) => HireError::Query(msg),
            RepositoryError::Serialization(msg) => HireError::Internal(msg),
            RepositoryError::InvalidId(id) => {
                HireError::bad_request(format!("invalid document id: {}", id))
            }
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convert a validated document id into the store's native key
pub fn object_id(id: &DocumentId) -> RepositoryResult<ObjectId> {
    ObjectId::parse_str(id.as_str()).map_err(|_| RepositoryError::InvalidId(id.to_string()))
}

/// Store-backed operations shared by every searchable entity
#[derive(Clone)]
pub struct EntityRepository {
    entity: &'static str,
    store: Arc<dyn DocumentStore>,
    hidden_fields: Vec<String>,
}

impl EntityRepository {
    pub fn new(entity: &'static str, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            entity,
            store,
            hidden_fields: vec![VERSION_FIELD.to_string()],
        }
    }

    /// Replace the fields hidden from every read
    pub fn with_hidden_fields(mut self, fields: Vec<String>) -> Self {
        self.hidden_fields = fields;
        self
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    fn executor(&self) -> SearchExecutor<'_, dyn DocumentStore> {
        SearchExecutor::new(self.store.as_ref()).with_hidden_fields(&self.hidden_fields)
    }

    fn hidden_projection(&self, extra: &[String]) -> Document {
        let mut projection = Document::new();
        for field in self.hidden_fields.iter().chain(extra) {
            projection.insert(field.clone(), 0);
        }
        projection
    }

    /// Paged search over the collection
    pub async fn search(&self, request: &SearchRequest) -> RepositoryResult<SearchResults<Document>> {
        self.executor().execute(request).await
    }

    /// Number of documents matching the request's filters
    pub async fn search_count(&self, request: &SearchRequest) -> RepositoryResult<u64> {
        self.executor().count(request).await
    }

    /// Every document, hidden fields removed
    pub async fn gets(&self) -> RepositoryResult<Vec<Document>> {
        self.store
            .find(Document::new(), Some(self.hidden_projection(&[])))
            .await
    }

    /// Fetch one document by id, dropping hidden fields and `exclude`
    pub async fn get(&self, id: &DocumentId, exclude: &[String]) -> RepositoryResult<Document> {
        let filter = doc! { "_id": object_id(id)? };
        let mut found = self
            .store
            .find(filter, Some(self.hidden_projection(exclude)))
            .await?;

        if found.is_empty() {
            return Err(RepositoryError::NotFound {
                entity: self.entity,
                id: id.to_string(),
            });
        }
        Ok(found.swap_remove(0))
    }

    /// Check whether any document matches the filter
    pub async fn exists(&self, filter: Document) -> RepositoryResult<bool> {
        let found = self.store.find(filter, Some(doc! { "_id": 1 })).await?;
        Ok(!found.is_empty())
    }

    /// Insert a document, returning its id
    pub async fn create(&self, document: Document) -> RepositoryResult<Bson> {
        let id = self.store.insert_one(document).await?;
        tracing::debug!(entity = self.entity, id = %id, "Document created");
        Ok(id)
    }

    /// Set the given fields on one document
    pub async fn update(&self, id: &DocumentId, changes: Document) -> RepositoryResult<()> {
        let filter = doc! { "_id": object_id(id)? };
        let matched = self.store.update_one(filter, doc! { "$set": changes }).await?;

        if matched == 0 {
            return Err(RepositoryError::NotFound {
                entity: self.entity,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Mark a document deleted without removing it
    pub async fn soft_delete(&self, id: &DocumentId) -> RepositoryResult<()> {
        self.update(id, doc! { "recordStatus": RECORD_STATUS_DELETED })
            .await?;
        tracing::info!(entity = self.entity, id = %id, "Document soft-deleted");
        Ok(())
    }
}
