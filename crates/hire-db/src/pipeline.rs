//! Aggregation pipeline assembly
//!
//! Stage order is fixed: `$project`, `$match`, `$sort`, `$limit`, `$skip`.
//! Only `$project` is always present.

use bson::{doc, Document};
use hire_search::{PageWindow, SortKey};

/// Internal document version field, never returned to callers
pub const VERSION_FIELD: &str = "__v";

/// Exclusion projection
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    excluded: Vec<String>,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            excluded: vec![VERSION_FIELD.to_string()],
        }
    }
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide one more field; repeats are ignored
    pub fn hide(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.excluded.contains(&field) {
            self.excluded.push(field);
        }
        self
    }

    pub fn hide_all<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        fields.into_iter().fold(self, |projection, f| projection.hide(f))
    }

    /// `{ field: 0, ... }`
    pub fn to_document(&self) -> Document {
        self.excluded
            .iter()
            .map(|field| (field.clone(), bson::Bson::Int32(0)))
            .collect()
    }
}

/// Build the `$sort` document from ordering keys, keeping their order.
///
/// A repeated field keeps its first position and takes the later direction.
pub fn sort_document(keys: &[SortKey]) -> Document {
    let mut document = Document::new();
    for key in keys {
        document.insert(key.field.clone(), key.order);
    }
    document
}

/// A compiled search pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPipeline {
    stages: Vec<Document>,
}

impl SearchPipeline {
    pub fn new(
        projection: &Projection,
        filter: Document,
        sort: Document,
        window: Option<PageWindow>,
    ) -> Self {
        let mut stages = vec![doc! { "$project": projection.to_document() }];

        if !filter.is_empty() {
            stages.push(doc! { "$match": filter });
        }
        if !sort.is_empty() {
            stages.push(doc! { "$sort": sort });
        }
        if let Some(window) = window {
            stages.push(doc! { "$limit": window.limit });
            stages.push(doc! { "$skip": window.offset });
        }

        Self { stages }
    }

    pub fn stages(&self) -> &[Document] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<Document> {
        self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hire_search::SortDirection;

    #[test]
    fn test_projection_always_hides_version() {
        assert_eq!(Projection::new().to_document(), doc! { "__v": 0 });
        assert_eq!(
            Projection::new().hide_all(["password", "__v"]).to_document(),
            doc! { "__v": 0, "password": 0 }
        );
    }

    #[test]
    fn test_sort_document_order() {
        let keys = vec![
            SortKey::new("a", SortDirection::Asc),
            SortKey::new("b", SortDirection::Desc),
        ];
        let sort = sort_document(&keys);
        let fields: Vec<_> = sort.keys().cloned().collect();
        assert_eq!(fields, vec!["a", "b"]);
        assert_eq!(sort, doc! { "a": 1, "b": -1 });
    }

    #[test]
    fn test_sort_document_duplicate_takes_later_direction() {
        let keys = vec![
            SortKey::new("a", SortDirection::Asc),
            SortKey::new("b", SortDirection::Asc),
            SortKey::new("a", SortDirection::Desc),
        ];
        assert_eq!(sort_document(&keys), doc! { "a": -1, "b": 1 });
    }

    #[test]
    fn test_minimal_pipeline() {
        let pipeline = SearchPipeline::new(&Projection::new(), Document::new(), Document::new(), None);
        assert_eq!(pipeline.stages(), &[doc! { "$project": { "__v": 0 } }]);
    }

    #[test]
    fn test_full_pipeline_stage_order() {
        let pipeline = SearchPipeline::new(
            &Projection::new().hide("password"),
            doc! { "status": "active" },
            doc! { "createdAt": -1 },
            Some(PageWindow { limit: 20, offset: 10 }),
        );

        assert_eq!(
            pipeline.into_stages(),
            vec![
                doc! { "$project": { "__v": 0, "password": 0 } },
                doc! { "$match": { "status": "active" } },
                doc! { "$sort": { "createdAt": -1 } },
                doc! { "$limit": 20_i64 },
                doc! { "$skip": 10_i64 },
            ]
        );
    }
}
