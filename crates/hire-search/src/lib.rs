//! # hire-search
//!
//! Search system for Hire RS.
//!
//! Callers describe a search as data (`sort`, `filter`, `pagination`,
//! `exclude`). This crate compiles that description into an engine-neutral
//! predicate AST, an ordering key list and a page window. It performs no I/O;
//! `hire-db` translates the compiled pieces into the document store's native
//! query language and runs them.
//!
//! ## Structure
//!
//! - `condition` - Comparison kinds a filter can apply
//! - `predicate` - Engine-neutral predicate AST
//! - `filters` - Filter specs and the filter compiler
//! - `sorts` - Sort specs and the sort compiler
//! - `pagination` - Page size/number and the page window
//! - `request` - The search request, its builder and the result envelope
//!
//! ## Example
//!
//! ```
//! use hire_search::{FilterCompiler, Predicate, SearchRequest};
//!
//! let request = SearchRequest::builder()
//!     .equals("status", "active")
//!     .sort_desc("createdAt")
//!     .page(20, 1)
//!     .build();
//!
//! let predicate = FilterCompiler::compile(&request.filter);
//! assert!(matches!(predicate, Predicate::Fields(_)));
//! assert_eq!(request.window().map(|w| w.limit), Some(20));
//! ```

pub mod condition;
pub mod predicate;
pub mod filters;
pub mod sorts;
pub mod pagination;
pub mod request;

// Re-exports for convenience
pub use condition::Condition;
pub use predicate::{DocumentId, FieldPredicate, FieldTest, Predicate, TextPattern};
pub use filters::{compile_filter, FilterCompiler, FilterOperator, FilterSpec, FilterValue};
pub use sorts::{SortCompiler, SortDirection, SortKey, SortSpec};
pub use pagination::{PageWindow, PaginationSpec};
pub use request::{SearchRequest, SearchRequestBuilder, SearchResults};
