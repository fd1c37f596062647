//! Predicate translation into MongoDB query documents
//!
//! This is the only place the engine-neutral predicate tree meets the
//! store's native query language.

use bson::{doc, Bson, Document};
use hire_search::{FieldTest, FilterValue, Predicate, TextPattern};

use crate::repository::{object_id, RepositoryResult};

/// Translate a composite predicate into a filter document.
///
/// `MatchAll` becomes the empty document, which matches everything.
pub fn to_document(predicate: &Predicate) -> RepositoryResult<Document> {
    match predicate {
        Predicate::MatchAll => Ok(Document::new()),
        Predicate::Fields(fields) => {
            let mut document = Document::new();
            for field in fields {
                document.insert(field.field.clone(), field_test(&field.test)?);
            }
            Ok(document)
        }
        Predicate::And(children) => Ok(doc! { "$and": children_to_bson(children)? }),
        Predicate::Or(children) => Ok(doc! { "$or": children_to_bson(children)? }),
    }
}

fn children_to_bson(children: &[Predicate]) -> RepositoryResult<Vec<Bson>> {
    children
        .iter()
        .map(|child| to_document(child).map(Bson::Document))
        .collect()
}

/// Regular expression source for a pattern, with the text escaped
pub fn pattern_source(pattern: &TextPattern) -> String {
    format!(
        "{}{}{}",
        if pattern.anchor_start { "^" } else { "" },
        regex::escape(&pattern.text),
        if pattern.anchor_end { "$" } else { "" },
    )
}

fn regex_document(pattern: &TextPattern) -> Document {
    doc! { "$regex": pattern_source(pattern), "$options": "i" }
}

/// Convert a filter value into its BSON form
pub fn value_to_bson(value: &FilterValue) -> RepositoryResult<Bson> {
    Ok(match value {
        FilterValue::String(s) => Bson::String(s.clone()),
        FilterValue::Integer(i) => Bson::Int64(*i),
        FilterValue::Float(f) => Bson::Double(*f),
        FilterValue::Bool(b) => Bson::Boolean(*b),
        FilterValue::Id(id) => Bson::ObjectId(object_id(id)?),
        FilterValue::DateTime(dt) => Bson::DateTime(bson::DateTime::from_chrono(*dt)),
    })
}

fn field_test(test: &FieldTest) -> RepositoryResult<Bson> {
    let condition = match test {
        FieldTest::Pattern(pattern) => regex_document(pattern),
        FieldTest::NotPattern(pattern) => doc! { "$not": regex_document(pattern) },
        FieldTest::IdEq(id) => return Ok(Bson::ObjectId(object_id(id)?)),
        FieldTest::IdNe(id) => doc! { "$ne": object_id(id)? },
        FieldTest::Eq(value) => doc! { "$eq": value_to_bson(value)? },
        FieldTest::Ne(value) => doc! { "$ne": value_to_bson(value)? },
        FieldTest::Gt(value) => doc! { "$gt": value_to_bson(value)? },
        FieldTest::Gte(value) => doc! { "$gte": value_to_bson(value)? },
        FieldTest::Lt(value) => doc! { "$lt": value_to_bson(value)? },
        FieldTest::Lte(value) => doc! { "$lte": value_to_bson(value)? },
    };
    Ok(Bson::Document(condition))
}
