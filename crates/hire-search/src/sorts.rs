//! Search sort orders
//!
//! Sort specs define how search results are ordered. List order is sort
//! priority: the first spec is the primary key.

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9, oldest first)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1, newest first)
    Desc,
}

impl SortDirection {
    /// Parse from an order token: `DESC` (any case) is descending, anything else ascending
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if t.trim().eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    /// Numeric form used by document stores (+1 / -1)
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// A single sort spec as callers send it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to sort by
    pub name: String,
    /// Order token, `ASC` or `DESC`
    #[serde(default)]
    pub order: Option<String>,
}

impl SortSpec {
    pub fn new(name: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: Some(order.into()),
        }
    }

    /// Create ascending sort
    pub fn asc(name: impl Into<String>) -> Self {
        Self::new(name, "ASC")
    }

    /// Create descending sort
    pub fn desc(name: impl Into<String>) -> Self {
        Self::new(name, "DESC")
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::from_token(self.order.as_deref())
    }
}

/// Compiled ordering key: field plus +1 (ascending) or -1 (descending)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: i32,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            order: direction.as_i32(),
        }
    }
}

/// Compiles sort specs into ordering keys.
///
/// Keys come out in input order. Repeated field names are not deduplicated;
/// how a store treats them is up to the store.
pub struct SortCompiler;

impl SortCompiler {
    pub fn compile(specs: &[SortSpec]) -> Vec<SortKey> {
        specs
            .iter()
            .map(|spec| SortKey::new(spec.name.clone(), spec.direction()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::from_token(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::from_token(Some("DESC")), SortDirection::Desc);
        assert_eq!(SortDirection::from_token(Some("Desc")), SortDirection::Desc);
        assert_eq!(SortDirection::from_token(Some("descending")), SortDirection::Asc);
        assert_eq!(SortDirection::from_token(None), SortDirection::Asc);
    }

    #[test]
    fn test_compile_preserves_order() {
        let keys = SortCompiler::compile(&[SortSpec::new("a", "ASC"), SortSpec::new("b", "DESC")]);

        assert_eq!(
            keys,
            vec![
                SortKey { field: "a".into(), order: 1 },
                SortKey { field: "b".into(), order: -1 },
            ]
        );
    }

    #[test]
    fn test_compile_keeps_duplicates() {
        let keys = SortCompiler::compile(&[SortSpec::asc("createdAt"), SortSpec::desc("createdAt")]);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].order, -1);
    }

    #[test]
    fn test_deserialize_without_order() {
        let spec: SortSpec = serde_json::from_str(r#"{"name":"lastName"}"#).unwrap();
        assert_eq!(spec.direction(), SortDirection::Asc);
    }
}
