//! Search filters
//!
//! A filter names one field, one condition, one value and the boolean
//! combinator that places it in the composite predicate. The compiler below
//! turns a list of filters into a single [`Predicate`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::condition::{self, Condition};
use crate::predicate::{DocumentId, FieldPredicate, FieldTest, Predicate, TextPattern};

/// Boolean combinator attached to a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "Option<String>")]
pub enum FilterOperator {
    And,
    Or,
    /// No combinator: merged into the implicit conjunction object
    #[default]
    None,
}

impl FilterOperator {
    /// Parse a combinator token; anything other than `AND`/`OR` is `None`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_uppercase().as_str() {
            "AND" => Self::And,
            "OR" => Self::Or,
            _ => Self::None,
        }
    }
}

impl From<Option<String>> for FilterOperator {
    fn from(token: Option<String>) -> Self {
        token
            .as_deref()
            .map(Self::from_token)
            .unwrap_or_default()
    }
}

/// Filter value types
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Document primary key
    Id(DocumentId),
    /// Point in time, compared natively by relational conditions
    DateTime(DateTime<Utc>),
}

impl FilterValue {
    /// Whether the value is a JSON-style number
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }

    /// The value as a document id, if it is one or is a string in id format
    pub fn as_document_id(&self) -> Option<DocumentId> {
        match self {
            Self::Id(id) => Some(id.clone()),
            Self::String(s) => DocumentId::parse(s),
            _ => None,
        }
    }

    /// String form used by pattern conditions
    pub fn to_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Id(id) => id.to_string(),
            Self::DateTime(dt) => dt.to_rfc3339(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DocumentId> for FilterValue {
    fn from(value: DocumentId) -> Self {
        Self::Id(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Id(id) => id.serialize(serializer),
            Self::DateTime(dt) => dt.serialize(serializer),
        }
    }
}

// Request bodies carry plain JSON scalars; ids and dates are recognised later.
impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = FilterValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FilterValue, E> {
                Ok(FilterValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FilterValue, E> {
                Ok(FilterValue::Integer(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FilterValue, E> {
                Ok(i64::try_from(v)
                    .map(FilterValue::Integer)
                    .unwrap_or(FilterValue::Float(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FilterValue, E> {
                Ok(FilterValue::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FilterValue, E> {
                Ok(FilterValue::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<FilterValue, E> {
                Ok(FilterValue::String(v))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// A single filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Field the filter applies to (e.g. "status", "companyId")
    pub name: String,
    /// Comparison to apply; `None` means case-insensitive exact match
    #[serde(default, deserialize_with = "condition::deserialize_token")]
    pub condition: Option<Condition>,
    /// Value to compare against
    pub value: FilterValue,
    /// Combinator placing this filter in the composite predicate
    #[serde(default)]
    pub operator: FilterOperator,
}

impl FilterSpec {
    /// Create a filter with no condition and no combinator
    pub fn new(name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            name: name.into(),
            condition: None,
            value: value.into(),
            operator: FilterOperator::None,
        }
    }

    /// Create a filter from raw tokens, the way request bodies describe them
    pub fn add_item(
        name: impl Into<String>,
        value: impl Into<FilterValue>,
        condition: &str,
        operator: &str,
    ) -> Self {
        Self {
            name: name.into(),
            condition: Condition::from_token(condition),
            value: value.into(),
            operator: FilterOperator::from_token(operator),
        }
    }

    /// Create a filter with the given condition
    pub fn with(name: impl Into<String>, condition: Condition, value: impl Into<FilterValue>) -> Self {
        Self::new(name, value).condition(condition)
    }

    pub fn equals(name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::with(name, Condition::Equals, value)
    }

    pub fn not_equals(name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::with(name, Condition::NotEquals, value)
    }

    pub fn contains(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with(name, Condition::Contains, FilterValue::String(value.into()))
    }

    pub fn starts_with(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with(name, Condition::StartsWith, FilterValue::String(value.into()))
    }

    pub fn ends_with(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with(name, Condition::EndsWith, FilterValue::String(value.into()))
    }

    /// Set the condition
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Place the filter in the AND group
    pub fn and(mut self) -> Self {
        self.operator = FilterOperator::And;
        self
    }

    /// Place the filter in the OR group
    pub fn or(mut self) -> Self {
        self.operator = FilterOperator::Or;
        self
    }
}

/// Compile one filter into a field predicate.
///
/// Rules, in priority order:
/// 1. no condition: case-insensitive exact match on the value's string form
/// 2. `Contains` / `StartsWith` / `EndsWith`: case-insensitive pattern with
///    the matching anchors
/// 3. `Equals`: id equality for id-shaped values, numeric equality for
///    numbers, otherwise the exact match of rule 1
/// 4. `NotEquals`: the negation of rule 3
/// 5. relational conditions: native comparison against the raw value
pub fn compile_filter(filter: &FilterSpec) -> FieldPredicate {
    let value = &filter.value;

    let test = match filter.condition {
        None => FieldTest::Pattern(TextPattern::exact(value.to_text())),
        Some(Condition::Contains) => FieldTest::Pattern(TextPattern::contains(value.to_text())),
        Some(Condition::StartsWith) => {
            FieldTest::Pattern(TextPattern::starts_with(value.to_text()))
        }
        Some(Condition::EndsWith) => FieldTest::Pattern(TextPattern::ends_with(value.to_text())),
        Some(Condition::Equals) => match value.as_document_id() {
            Some(id) => FieldTest::IdEq(id),
            None if value.is_numeric() => FieldTest::Eq(value.clone()),
            None => FieldTest::Pattern(TextPattern::exact(value.to_text())),
        },
        Some(Condition::NotEquals) => match value.as_document_id() {
            Some(id) => FieldTest::IdNe(id),
            None if value.is_numeric() => FieldTest::Ne(value.clone()),
            None => FieldTest::NotPattern(TextPattern::exact(value.to_text())),
        },
        Some(Condition::GreaterThan) => FieldTest::Gt(value.clone()),
        Some(Condition::GreaterOrEqual) => FieldTest::Gte(value.clone()),
        Some(Condition::LessThan) => FieldTest::Lt(value.clone()),
        Some(Condition::LessOrEqual) => FieldTest::Lte(value.clone()),
    };

    FieldPredicate::new(filter.name.clone(), test)
}

/// Combines a request's filters into one composite predicate.
///
/// Filters are partitioned by combinator:
///
/// - AND and OR both present: `And([ands..., Or(ors)])`
/// - only AND: `And(ands)`
/// - only OR: `Or(ors)`
/// - only NONE: the merged implicit conjunction
/// - nothing: `MatchAll`
///
/// NONE filters are merged per field with last-write-wins, and the merged
/// object is dropped as soon as any AND or OR filter is present.
pub struct FilterCompiler;

impl FilterCompiler {
    pub fn compile(filters: &[FilterSpec]) -> Predicate {
        let mut and_group = Vec::new();
        let mut or_group = Vec::new();
        let mut merged = Vec::new();

        for filter in filters {
            let predicate = compile_filter(filter);
            match filter.operator {
                FilterOperator::And => and_group.push(Predicate::field(predicate)),
                FilterOperator::Or => or_group.push(Predicate::field(predicate)),
                FilterOperator::None => Predicate::merge_field(&mut merged, predicate),
            }
        }

        match (and_group.is_empty(), or_group.is_empty()) {
            (false, false) => {
                and_group.push(Predicate::Or(or_group));
                Predicate::And(and_group)
            }
            (false, true) => Predicate::And(and_group),
            (true, false) => Predicate::Or(or_group),
            (true, true) if merged.is_empty() => Predicate::MatchAll,
            (true, true) => Predicate::Fields(merged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OID: &str = "65f1c0ffee0000000000beef";

    fn test_of(filter: FilterSpec) -> FieldTest {
        compile_filter(&filter).test
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!(FilterOperator::from_token("and"), FilterOperator::And);
        assert_eq!(FilterOperator::from_token("OR"), FilterOperator::Or);
        assert_eq!(FilterOperator::from_token(""), FilterOperator::None);
        assert_eq!(FilterOperator::from_token("xor"), FilterOperator::None);
    }

    #[test]
    fn test_no_condition_is_exact_pattern() {
        assert_eq!(
            test_of(FilterSpec::new("status", "Active")),
            FieldTest::Pattern(TextPattern::exact("Active"))
        );
    }

    #[test]
    fn test_text_conditions() {
        assert_eq!(
            test_of(FilterSpec::contains("name", "ada")),
            FieldTest::Pattern(TextPattern::contains("ada"))
        );
        assert_eq!(
            test_of(FilterSpec::starts_with("name", "ada")),
            FieldTest::Pattern(TextPattern::starts_with("ada"))
        );
        assert_eq!(
            test_of(FilterSpec::ends_with("email", "@example.com")),
            FieldTest::Pattern(TextPattern::ends_with("@example.com"))
        );
    }

    #[test]
    fn test_equals_prefers_document_id() {
        let expected = FieldTest::IdEq(DocumentId::parse(OID).unwrap());
        assert_eq!(test_of(FilterSpec::equals("companyId", OID)), expected);
    }

    #[test]
    fn test_equals_numeric() {
        assert_eq!(
            test_of(FilterSpec::equals("recordStatus", 1)),
            FieldTest::Eq(FilterValue::Integer(1))
        );
        assert_eq!(
            test_of(FilterSpec::equals("rating", 4.5)),
            FieldTest::Eq(FilterValue::Float(4.5))
        );
    }

    #[test]
    fn test_equals_string_falls_back_to_exact_pattern() {
        assert_eq!(
            test_of(FilterSpec::equals("status", "active")),
            FieldTest::Pattern(TextPattern::exact("active"))
        );
        // numeric-looking strings are still strings
        assert_eq!(
            test_of(FilterSpec::equals("zip", "10115")),
            FieldTest::Pattern(TextPattern::exact("10115"))
        );
    }

    #[test]
    fn test_not_equals_mirrors_equals() {
        assert_eq!(
            test_of(FilterSpec::not_equals("companyId", OID)),
            FieldTest::IdNe(DocumentId::parse(OID).unwrap())
        );
        assert_eq!(
            test_of(FilterSpec::not_equals("recordStatus", 3)),
            FieldTest::Ne(FilterValue::Integer(3))
        );
        assert_eq!(
            test_of(FilterSpec::not_equals("status", "deleted")),
            FieldTest::NotPattern(TextPattern::exact("deleted"))
        );
    }

    #[test]
    fn test_relational_conditions_keep_raw_value() {
        assert_eq!(
            test_of(FilterSpec::with("experience", Condition::GreaterThan, 3)),
            FieldTest::Gt(FilterValue::Integer(3))
        );
        assert_eq!(
            test_of(FilterSpec::with("experience", Condition::GreaterOrEqual, "3")),
            FieldTest::Gte(FilterValue::String("3".into()))
        );
        assert_eq!(
            test_of(FilterSpec::with("experience", Condition::LessThan, 10)),
            FieldTest::Lt(FilterValue::Integer(10))
        );
        assert_eq!(
            test_of(FilterSpec::with("experience", Condition::LessOrEqual, 10)),
            FieldTest::Lte(FilterValue::Integer(10))
        );
    }

    #[test]
    fn test_compile_empty() {
        assert_eq!(FilterCompiler::compile(&[]), Predicate::MatchAll);
    }

    #[test]
    fn test_compile_and_only() {
        let filters = vec![
            FilterSpec::new("status", "active").and(),
            FilterSpec::contains("name", "ada").and(),
        ];

        let expected = Predicate::And(vec![
            Predicate::field(compile_filter(&filters[0])),
            Predicate::field(compile_filter(&filters[1])),
        ]);
        assert_eq!(FilterCompiler::compile(&filters), expected);
    }

    #[test]
    fn test_compile_or_only() {
        let filters = vec![
            FilterSpec::contains("firstName", "ada").or(),
            FilterSpec::contains("lastName", "ada").or(),
        ];

        let expected = Predicate::Or(vec![
            Predicate::field(compile_filter(&filters[0])),
            Predicate::field(compile_filter(&filters[1])),
        ]);
        assert_eq!(FilterCompiler::compile(&filters), expected);
    }

    #[test]
    fn test_compile_mixed_drops_none_group() {
        let filters = vec![
            FilterSpec::equals("recordStatus", 1).and(),
            FilterSpec::new("role", "interviewer"),
            FilterSpec::contains("firstName", "ada").or(),
            FilterSpec::contains("lastName", "ada").or(),
        ];

        let expected = Predicate::And(vec![
            Predicate::field(compile_filter(&filters[0])),
            Predicate::Or(vec![
                Predicate::field(compile_filter(&filters[2])),
                Predicate::field(compile_filter(&filters[3])),
            ]),
        ]);
        assert_eq!(FilterCompiler::compile(&filters), expected);
    }

    #[test]
    fn test_compile_and_with_none_drops_none_group() {
        let filters = vec![
            FilterSpec::new("role", "interviewer"),
            FilterSpec::equals("recordStatus", 1).and(),
        ];

        assert_eq!(
            FilterCompiler::compile(&filters),
            Predicate::And(vec![Predicate::field(compile_filter(&filters[1]))])
        );
    }

    #[test]
    fn test_compile_none_group_merges_by_field() {
        let filters = vec![
            FilterSpec::new("status", "active"),
            FilterSpec::contains("name", "ada"),
            FilterSpec::new("status", "pending"),
        ];

        assert_eq!(
            FilterCompiler::compile(&filters),
            Predicate::Fields(vec![
                FieldPredicate::new("status", FieldTest::Pattern(TextPattern::exact("pending"))),
                FieldPredicate::new("name", FieldTest::Pattern(TextPattern::contains("ada"))),
            ])
        );
    }

    #[test]
    fn test_compile_does_not_mutate_input() {
        let filters = vec![
            FilterSpec::new("status", "active").and(),
            FilterSpec::new("role", "admin").or(),
        ];
        let before = filters.clone();

        let first = FilterCompiler::compile(&filters);
        let second = FilterCompiler::compile(&filters);

        assert_eq!(filters, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_deserialize_filter() {
        let filter: FilterSpec = serde_json::from_str(
            r#"{"name":"status","value":"active","condition":"=","operator":"and"}"#,
        )
        .unwrap();

        assert_eq!(filter.name, "status");
        assert_eq!(filter.condition, Some(Condition::Equals));
        assert_eq!(filter.value, FilterValue::String("active".into()));
        assert_eq!(filter.operator, FilterOperator::And);
    }

    #[test]
    fn test_deserialize_filter_defaults() {
        let filter: FilterSpec =
            serde_json::from_str(r#"{"name":"recordStatus","value":1,"condition":""}"#).unwrap();

        assert_eq!(filter.condition, None);
        assert_eq!(filter.value, FilterValue::Integer(1));
        assert_eq!(filter.operator, FilterOperator::None);

        let filter: FilterSpec =
            serde_json::from_str(r#"{"name":"rating","value":4.5,"operator":null}"#).unwrap();
        assert_eq!(filter.value, FilterValue::Float(4.5));
        assert_eq!(filter.operator, FilterOperator::None);
    }

    #[test]
    fn test_add_item() {
        let filter = FilterSpec::add_item("companyId", OID, "=", "");
        assert_eq!(filter.condition, Some(Condition::Equals));
        assert_eq!(filter.operator, FilterOperator::None);
    }
}
