//! Page-based pagination
//!
//! A page is described by `size` and `page` (1-indexed). Missing or zero
//! values fall back to `size = 10`, `page = 1`; negative values are passed
//! through untouched and left for the document store to reject.
//!
//! An object that names either key, even as `null`, counts as a pagination
//! request. Only `{}` means "no pagination".

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_PAGE: i64 = 1;

/// Pagination parameters as callers send them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawPagination")]
pub struct PaginationSpec {
    /// Items per page
    pub size: Option<i64>,
    /// Page number (1-indexed)
    pub page: Option<i64>,
    /// Whether the caller named at least one key
    #[serde(skip)]
    keyed: bool,
}

/// Wire shape that keeps `null` apart from a missing key
#[derive(Deserialize)]
struct RawPagination {
    #[serde(default, deserialize_with = "present")]
    size: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    page: Option<Option<i64>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

impl From<RawPagination> for PaginationSpec {
    fn from(raw: RawPagination) -> Self {
        Self {
            keyed: raw.size.is_some() || raw.page.is_some(),
            size: raw.size.flatten(),
            page: raw.page.flatten(),
        }
    }
}

/// Compiled page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Rows requested before the offset is applied
    pub limit: i64,
    /// Rows skipped
    pub offset: i64,
}

impl PaginationSpec {
    pub fn new(size: i64, page: i64) -> Self {
        Self {
            size: Some(size),
            page: Some(page),
            keyed: true,
        }
    }

    /// True when the caller named neither key
    pub fn is_empty(&self) -> bool {
        !self.keyed && self.size.is_none() && self.page.is_none()
    }

    pub fn size(&self) -> i64 {
        match self.size {
            Some(size) if size != 0 => size,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn page(&self) -> i64 {
        match self.page {
            Some(page) if page != 0 => page,
            _ => DEFAULT_PAGE,
        }
    }

    /// Calculate the limit: `size * page`.
    ///
    /// The limit stage runs before the skip stage, so it must cover every
    /// row up to the end of the requested page.
    pub fn limit(&self) -> i64 {
        self.size().saturating_mul(self.page())
    }

    /// Calculate the offset: `(page - 1) * size`
    pub fn offset(&self) -> i64 {
        (self.page().saturating_sub(1)).saturating_mul(self.size())
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            limit: self.limit(),
            offset: self.offset(),
        }
    }
}
