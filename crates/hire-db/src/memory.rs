//! In-process document store
//!
//! Holds a collection in memory and evaluates the part of the MongoDB query
//! language the search layer produces:
//!
//! - filters: `$and`, `$or`, `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`,
//!   `$regex` with `$options`, `$not`, bare equality and dotted paths
//! - pipeline stages: `$project`, `$match`, `$sort`, `$limit`, `$skip`
//! - updates: `$set`, `$unset`
//!
//! Malformed stages fail the same way the server fails them, so callers see
//! a store error instead of a silently wrong page.

use std::cmp::Ordering;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use parking_lot::RwLock;
use regex::RegexBuilder;

use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::DocumentStore;

/// Collection held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Copy of every stored document
    pub fn snapshot(&self) -> Vec<Document> {
        self.documents.read().clone()
    }

    fn filtered(&self, filter: &Document) -> RepositoryResult<Vec<Document>> {
        let documents = self.documents.read();
        let mut found = Vec::new();
        for document in documents.iter() {
            if matches_filter(document, filter)? {
                found.push(document.clone());
            }
        }
        Ok(found)
    }

    fn run_pipeline(&self, pipeline: &[Document]) -> RepositoryResult<Vec<Document>> {
        let mut documents = self.snapshot();
        for stage in pipeline {
            documents = apply_stage(stage, documents)?;
        }
        Ok(documents)
    }

    fn insert(&self, mut document: Document) -> RepositoryResult<Bson> {
        let id = match document.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert("_id", id.clone());
                id
            }
        };

        let mut documents = self.documents.write();
        if documents.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(query_error(format!("E11000 duplicate key error: _id {}", id)));
        }
        documents.push(document);
        Ok(id)
    }

    fn update(&self, filter: &Document, update: &Document) -> RepositoryResult<u64> {
        validate_update(update)?;

        let mut documents = self.documents.write();
        for document in documents.iter_mut() {
            if matches_filter(document, filter)? {
                apply_update(document, update)?;
                return Ok(1);
            }
        }
        Ok(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> RepositoryResult<Vec<Document>> {
        let documents = self.filtered(&filter)?;
        match projection {
            Some(spec) => documents.into_iter().map(|d| project(d, &spec)).collect(),
            None => Ok(documents),
        }
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> RepositoryResult<Vec<Document>> {
        self.run_pipeline(&pipeline)
    }

    async fn count_documents(&self, filter: Document) -> RepositoryResult<u64> {
        Ok(self.filtered(&filter)?.len() as u64)
    }

    async fn insert_one(&self, document: Document) -> RepositoryResult<Bson> {
        self.insert(document)
    }

    async fn update_one(&self, filter: Document, update: Document) -> RepositoryResult<u64> {
        self.update(&filter, &update)
    }
}

fn query_error(message: impl Into<String>) -> RepositoryError {
    RepositoryError::Query(message.into())
}

// Pipeline stages

fn apply_stage(stage: &Document, documents: Vec<Document>) -> RepositoryResult<Vec<Document>> {
    let mut entries = stage.iter();
    let (name, spec) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(query_error(
                "A pipeline stage specification object must contain exactly one field.",
            ))
        }
    };

    match name.as_str() {
        "$project" => {
            let spec = stage_document(name, spec)?;
            documents.into_iter().map(|d| project(d, spec)).collect()
        }
        "$match" => {
            let filter = stage_document(name, spec)?;
            let mut kept = Vec::with_capacity(documents.len());
            for document in documents {
                if matches_filter(&document, filter)? {
                    kept.push(document);
                }
            }
            Ok(kept)
        }
        "$sort" => sort(documents, stage_document(name, spec)?),
        "$limit" => {
            let limit = stage_integer(name, spec)?;
            if limit <= 0 {
                return Err(query_error(format!(
                    "invalid argument to $limit stage: the limit must be positive, got {}",
                    limit
                )));
            }
            let limit = usize::try_from(limit).unwrap_or(usize::MAX);
            Ok(documents.into_iter().take(limit).collect())
        }
        "$skip" => {
            let skip = stage_integer(name, spec)?;
            if skip < 0 {
                return Err(query_error(format!(
                    "invalid argument to $skip stage: expected a non-negative number, got {}",
                    skip
                )));
            }
            let skip = usize::try_from(skip).unwrap_or(usize::MAX);
            Ok(documents.into_iter().skip(skip).collect())
        }
        other => Err(query_error(format!(
            "Unrecognized pipeline stage name: '{}'",
            other
        ))),
    }
}

fn stage_document<'a>(stage: &str, spec: &'a Bson) -> RepositoryResult<&'a Document> {
    match spec {
        Bson::Document(document) => Ok(document),
        _ => Err(query_error(format!(
            "{} specification must be an object",
            stage
        ))),
    }
}

fn stage_integer(stage: &str, spec: &Bson) -> RepositoryResult<i64> {
    match spec {
        Bson::Int32(n) => Ok(i64::from(*n)),
        Bson::Int64(n) => Ok(*n),
        Bson::Double(f) if f.fract() == 0.0 => Ok(*f as i64),
        _ => Err(query_error(format!("{} must be an integer", stage))),
    }
}

fn project(document: Document, spec: &Document) -> RepositoryResult<Document> {
    let mut included = Vec::new();
    let mut excluded = Vec::new();
    let mut hide_id = false;

    for (field, flag) in spec {
        let include = projection_flag(field, flag)?;
        match (field.as_str(), include) {
            ("_id", false) => hide_id = true,
            ("_id", true) => {}
            (_, true) => included.push(field.as_str()),
            (_, false) => excluded.push(field.as_str()),
        }
    }

    if !included.is_empty() && !excluded.is_empty() {
        return Err(query_error(format!(
            "Cannot do exclusion on field {} in inclusion projection",
            excluded[0]
        )));
    }

    let inclusive = !included.is_empty() || spec.iter().any(|(f, v)| f == "_id" && is_truthy(v));
    let mut document = if inclusive {
        let mut projected = Document::new();
        if let Some(id) = document.get("_id") {
            projected.insert("_id", id.clone());
        }
        for field in included {
            if let Some(value) = lookup(&document, field) {
                set_path(&mut projected, field, value.clone())?;
            }
        }
        projected
    } else {
        let mut document = document;
        for field in excluded {
            remove_path(&mut document, field);
        }
        document
    };

    if hide_id {
        document.remove("_id");
    }
    Ok(document)
}

fn projection_flag(field: &str, flag: &Bson) -> RepositoryResult<bool> {
    match flag {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Boolean(_) => Ok(is_truthy(flag)),
        _ => Err(query_error(format!(
            "unsupported projection value for field {}",
            field
        ))),
    }
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(f) => *f != 0.0,
        Bson::Boolean(b) => *b,
        _ => false,
    }
}

fn sort(mut documents: Vec<Document>, spec: &Document) -> RepositoryResult<Vec<Document>> {
    if spec.is_empty() {
        return Err(query_error("$sort stage must have at least one sort key"));
    }

    let mut keys = Vec::with_capacity(spec.len());
    for (field, direction) in spec {
        let descending = match stage_integer("$sort", direction) {
            Ok(1) => false,
            Ok(-1) => true,
            _ => {
                return Err(query_error(
                    "$sort key ordering must be 1 (for ascending) or -1 (for descending)",
                ))
            }
        };
        keys.push((field.as_str(), descending));
    }

    documents.sort_by(|a, b| {
        for (field, descending) in &keys {
            let ordering = sort_order(lookup(a, field), lookup(b, field));
            if ordering != Ordering::Equal {
                return if *descending { ordering.reverse() } else { ordering };
            }
        }
        Ordering::Equal
    });

    Ok(documents)
}

// Filters

fn matches_filter(document: &Document, filter: &Document) -> RepositoryResult<bool> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches_filter(document, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(key, condition)? {
                    if matches_filter(document, clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            operator if operator.starts_with('$') => {
                return Err(query_error(format!(
                    "unknown top level operator: {}",
                    operator
                )))
            }
            path => matches_field(lookup(document, path), condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses<'a>(operator: &str, condition: &'a Bson) -> RepositoryResult<Vec<&'a Document>> {
    let items = match condition {
        Bson::Array(items) if !items.is_empty() => items,
        _ => {
            return Err(query_error(format!(
                "{} must be a nonempty array",
                operator
            )))
        }
    };

    items
        .iter()
        .map(|item| match item {
            Bson::Document(clause) => Ok(clause),
            _ => Err(query_error(format!(
                "{} argument's entries must be objects",
                operator
            ))),
        })
        .collect()
}

fn is_operator_document(document: &Document) -> bool {
    document
        .keys()
        .next()
        .map_or(false, |key| key.starts_with('$'))
}

fn matches_field(value: Option<&Bson>, condition: &Bson) -> RepositoryResult<bool> {
    match condition {
        Bson::Document(operators) if is_operator_document(operators) => {
            evaluate_operators(value, operators)
        }
        Bson::RegularExpression(regex) => regex_matches(value, &regex.pattern, &regex.options),
        expected => Ok(values_equal(value, expected)),
    }
}

fn evaluate_operators(value: Option<&Bson>, operators: &Document) -> RepositoryResult<bool> {
    for (operator, argument) in operators {
        let matched = match operator.as_str() {
            "$eq" => values_equal(value, argument),
            "$ne" => !values_equal(value, argument),
            "$gt" => compare(value, argument) == Some(Ordering::Greater),
            "$gte" => matches!(
                compare(value, argument),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            "$lt" => compare(value, argument) == Some(Ordering::Less),
            "$lte" => matches!(
                compare(value, argument),
                Some(Ordering::Less | Ordering::Equal)
            ),
            "$regex" => {
                let options = operators.get_str("$options").unwrap_or("");
                match argument {
                    Bson::String(pattern) => regex_matches(value, pattern, options)?,
                    Bson::RegularExpression(regex) => {
                        regex_matches(value, &regex.pattern, &regex.options)?
                    }
                    _ => return Err(query_error("$regex has to be a string")),
                }
            }
            "$options" => {
                if !operators.contains_key("$regex") {
                    return Err(query_error("$options needs a $regex"));
                }
                true
            }
            "$not" => match argument {
                Bson::Document(inner) if is_operator_document(inner) => {
                    !evaluate_operators(value, inner)?
                }
                Bson::RegularExpression(regex) => {
                    !regex_matches(value, &regex.pattern, &regex.options)?
                }
                _ => return Err(query_error("$not needs a regex or a document")),
            },
            other => return Err(query_error(format!("unknown operator: {}", other))),
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn regex_matches(value: Option<&Bson>, pattern: &str, options: &str) -> RepositoryResult<bool> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .build()
        .map_err(|e| query_error(format!("invalid regular expression: {}", e)))?;

    Ok(match value {
        Some(Bson::String(s)) => regex.is_match(s),
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(s) if regex.is_match(s))),
        _ => false,
    })
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

fn scalar_equal(actual: &Bson, expected: &Bson) -> bool {
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => actual == expected,
    }
}

/// Equality the way the server applies it: numbers compare across widths,
/// a missing field equals `null`, an array matches if any element does.
fn values_equal(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => matches!(expected, Bson::Null),
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| scalar_equal(item, expected))
        }
        Some(actual) => scalar_equal(actual, expected),
    }
}

/// Ordering between values of the same kind; `None` when not comparable
fn compare_bson(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => Some((x.time, x.increment).cmp(&(y.time, y.increment))),
        _ => None,
    }
}

fn compare(value: Option<&Bson>, argument: &Bson) -> Option<Ordering> {
    compare_bson(value?, argument)
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)) => 1,
        Some(Bson::String(_) | Bson::Symbol(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::Binary(_)) => 5,
        Some(Bson::ObjectId(_)) => 6,
        Some(Bson::Boolean(_)) => 7,
        Some(Bson::DateTime(_)) => 8,
        Some(Bson::Timestamp(_)) => 9,
        Some(Bson::RegularExpression(_)) => 10,
        Some(_) => 11,
    }
}

/// Sort order across kinds: missing and null first, then numbers, strings,
/// and so on.
fn sort_order(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(x), Some(y)) => compare_bson(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

// Paths and updates

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn remove_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = document.get_mut(head) {
                remove_path(inner, rest);
            }
        }
    }
}

fn set_path(document: &mut Document, path: &str, value: Bson) -> RepositoryResult<()> {
    let (head, rest) = match path.split_once('.') {
        None => {
            document.insert(path, value);
            return Ok(());
        }
        Some(split) => split,
    };

    if !document.contains_key(head) {
        document.insert(head, Document::new());
    }
    match document.get_mut(head) {
        Some(Bson::Document(inner)) => set_path(inner, rest, value),
        _ => Err(query_error(format!(
            "Cannot create field '{}' in element {{{}}}",
            rest, head
        ))),
    }
}

fn validate_update(update: &Document) -> RepositoryResult<()> {
    if update.is_empty() {
        return Err(query_error("update document must not be empty"));
    }
    for (operator, fields) in update {
        match operator.as_str() {
            "$set" | "$unset" => {
                stage_document(operator, fields)?;
            }
            other if other.starts_with('$') => {
                return Err(query_error(format!("Unknown modifier: {}", other)))
            }
            _ => return Err(query_error("update document requires atomic operators")),
        }
    }
    Ok(())
}

fn apply_update(document: &mut Document, update: &Document) -> RepositoryResult<()> {
    for (operator, fields) in update {
        let fields = stage_document(operator, fields)?;
        for (path, value) in fields {
            if operator == "$set" {
                set_path(document, path, value.clone())?;
            } else {
                remove_path(document, path);
            }
        }
    }
    Ok(())
}
