//! MongoDB-backed document store

use async_trait::async_trait;
use bson::{Bson, Document};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::repository::RepositoryResult;
use crate::store::DocumentStore;

/// `DocumentStore` over one MongoDB collection
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> RepositoryResult<Vec<Document>> {
        let mut options = FindOptions::default();
        options.projection = projection;

        let cursor = self.collection.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> RepositoryResult<Vec<Document>> {
        let cursor = self.collection.aggregate(pipeline, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_documents(&self, filter: Document) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(filter, None).await?)
    }

    async fn insert_one(&self, document: Document) -> RepositoryResult<Bson> {
        let result = self.collection.insert_one(document, None).await?;
        Ok(result.inserted_id)
    }

    async fn update_one(&self, filter: Document, update: Document) -> RepositoryResult<u64> {
        let result = self.collection.update_one(filter, update, None).await?;
        Ok(result.matched_count)
    }
}
