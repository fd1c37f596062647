//! # hire-db
//!
//! Document store layer for Hire RS.
//!
//! This crate runs `hire-search` requests against a document store:
//!
//! - the `DocumentStore` seam, with MongoDB and in-memory implementations
//! - translation of the predicate tree into MongoDB filter documents
//! - aggregation pipeline assembly and the search executor
//! - repositories for users and companies
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hire_db::{Database, UserRepository};
//! use hire_search::SearchRequest;
//!
//! let db = Database::connect(&config.database).await?;
//! let users = UserRepository::new(Arc::new(db.store(hire_db::users::COLLECTION)));
//!
//! let request = SearchRequest::builder().contains("name", "ada").page(10, 1).build();
//! let page = users.search(&request).await?;
//! ```

pub mod companies;
pub mod memory;
pub mod mongo;
pub mod pipeline;
pub mod pool;
pub mod repository;
pub mod search_executor;
pub mod store;
pub mod translate;
pub mod users;

// Re-exports
pub use companies::CompanyRepository;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use pipeline::{sort_document, Projection, SearchPipeline, VERSION_FIELD};
pub use pool::Database;
pub use repository::{
    EntityRepository, RepositoryError, RepositoryResult, RECORD_STATUS_DELETED,
};
pub use search_executor::SearchExecutor;
pub use store::DocumentStore;
pub use users::UserRepository;
