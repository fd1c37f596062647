//! Search requests and results
//!
//! A `SearchRequest` is built per call (usually straight from a JSON body),
//! compiled, executed once and dropped.

use serde::{Deserialize, Deserializer, Serialize};

use crate::condition::Condition;
use crate::filters::{FilterCompiler, FilterSpec, FilterValue};
use crate::pagination::{PageWindow, PaginationSpec};
use crate::predicate::Predicate;
use crate::sorts::{SortCompiler, SortKey, SortSpec};

/// Declarative search criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Sort specs, in priority order
    #[serde(deserialize_with = "null_as_default")]
    pub sort: Vec<SortSpec>,
    /// Filters, combined by their operators
    #[serde(deserialize_with = "null_as_default")]
    pub filter: Vec<FilterSpec>,
    /// Page window; absent means unpaginated
    pub pagination: Option<PaginationSpec>,
    /// Fields dropped from the returned documents
    #[serde(deserialize_with = "null_as_default")]
    pub exclude: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SearchRequestBuilder {
        SearchRequestBuilder::new()
    }

    /// Check if any filter targets the given field
    pub fn has_filter_for(&self, name: &str) -> bool {
        self.filter.iter().any(|f| f.name == name)
    }

    /// Composite predicate for the request's filters
    pub fn predicate(&self) -> Predicate {
        FilterCompiler::compile(&self.filter)
    }

    /// Ordering keys for the request's sort specs
    pub fn sort_keys(&self) -> Vec<SortKey> {
        SortCompiler::compile(&self.sort)
    }

    /// Page window, if the request carries a non-empty pagination object
    pub fn window(&self) -> Option<PageWindow> {
        self.pagination
            .filter(|p| !p.is_empty())
            .map(|p| p.window())
    }
}

/// Builder for constructing search requests fluently
#[derive(Debug, Default)]
pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // Filter methods

    /// Add a raw filter
    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.request.filter.push(filter);
        self
    }

    pub fn equals(self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(FilterSpec::equals(name, value))
    }

    pub fn not_equals(self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(FilterSpec::not_equals(name, value))
    }

    pub fn contains(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(FilterSpec::contains(name, value))
    }

    pub fn starts_with(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(FilterSpec::starts_with(name, value))
    }

    pub fn ends_with(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(FilterSpec::ends_with(name, value))
    }

    pub fn greater_than(self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(FilterSpec::with(name, Condition::GreaterThan, value))
    }

    pub fn at_least(self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(FilterSpec::with(name, Condition::GreaterOrEqual, value))
    }

    pub fn less_than(self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(FilterSpec::with(name, Condition::LessThan, value))
    }

    pub fn at_most(self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(FilterSpec::with(name, Condition::LessOrEqual, value))
    }

    // Sort methods

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.request.sort.push(spec);
        self
    }

    pub fn sort_asc(self, name: impl Into<String>) -> Self {
        self.sort(SortSpec::asc(name))
    }

    pub fn sort_desc(self, name: impl Into<String>) -> Self {
        self.sort(SortSpec::desc(name))
    }

    // Pagination and projection

    pub fn page(mut self, size: i64, page: i64) -> Self {
        self.request.pagination = Some(PaginationSpec::new(size, page));
        self
    }

    pub fn pagination(mut self, pagination: PaginationSpec) -> Self {
        self.request.pagination = Some(pagination);
        self
    }

    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.request.exclude.push(field.into());
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}

/// Paged search result envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults<T> {
    /// Total matching rows, ignoring pagination
    pub rows_count: u64,
    /// The requested page of rows
    pub rows: Vec<T>,
}

impl<T> SearchResults<T> {
    pub fn new(rows_count: u64, rows: Vec<T>) -> Self {
        Self { rows_count, rows }
    }

    /// Map every row, keeping the count
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> SearchResults<U> {
        SearchResults {
            rows_count: self.rows_count,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }
}
