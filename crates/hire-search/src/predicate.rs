//! Engine-neutral predicate AST
//!
//! Filters compile into this tree. The tree knows nothing about any concrete
//! query language; `hire-db` owns the translation into the document store's
//! native predicate format.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::filters::FilterValue;

/// A document primary key in its canonical form: 24 hexadecimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parse a document id, returning `None` unless `raw` is exactly 24 hex digits.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Case-insensitive text pattern with optional anchors.
///
/// `text` is matched literally; translators escape it for their pattern syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPattern {
    pub text: String,
    pub anchor_start: bool,
    pub anchor_end: bool,
}

impl TextPattern {
    /// Whole-value match (anchored at both ends)
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor_start: true,
            anchor_end: true,
        }
    }

    /// Substring match (unanchored)
    pub fn contains(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor_start: false,
            anchor_end: false,
        }
    }

    /// Prefix match
    pub fn starts_with(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor_start: true,
            anchor_end: false,
        }
    }

    /// Suffix match
    pub fn ends_with(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor_start: false,
            anchor_end: true,
        }
    }
}

/// Test applied to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTest {
    /// Field's string form matches the pattern
    Pattern(TextPattern),
    /// Field's string form does not match the pattern
    NotPattern(TextPattern),
    /// Field equals the document id
    IdEq(DocumentId),
    /// Field differs from the document id
    IdNe(DocumentId),
    Eq(FilterValue),
    Ne(FilterValue),
    Gt(FilterValue),
    Gte(FilterValue),
    Lt(FilterValue),
    Lte(FilterValue),
}

/// One field, one test
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub test: FieldTest,
}

impl FieldPredicate {
    pub fn new(field: impl Into<String>, test: FieldTest) -> Self {
        Self {
            field: field.into(),
            test,
        }
    }
}

/// Composite predicate built from a request's filters
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    /// No constraint; matches every document
    #[default]
    MatchAll,
    /// Implicit conjunction of field tests, at most one test per field
    Fields(Vec<FieldPredicate>),
    /// Every child must match
    And(Vec<Predicate>),
    /// At least one child must match
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Single-field predicate
    pub fn field(predicate: FieldPredicate) -> Self {
        Self::Fields(vec![predicate])
    }

    /// Whether this predicate places no constraint on documents
    pub fn is_match_all(&self) -> bool {
        match self {
            Self::MatchAll => true,
            Self::Fields(fields) => fields.is_empty(),
            Self::And(_) | Self::Or(_) => false,
        }
    }

    /// Insert a field test into an implicit conjunction.
    ///
    /// A test on a field that is already present replaces the earlier test in
    /// place, so the last write wins and the field keeps its first position.
    pub fn merge_field(fields: &mut Vec<FieldPredicate>, predicate: FieldPredicate) {
        match fields.iter_mut().find(|p| p.field == predicate.field) {
            Some(existing) => existing.test = predicate.test,
            None => fields.push(predicate),
        }
    }
}
