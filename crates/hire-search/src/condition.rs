//! Filter conditions
//!
//! A condition says how a filter's value is compared against a document
//! field. On the wire a condition is a short token (`=`, `!`, `CONTAINS`,
//! `>=`, ...). An empty or unrecognised token means "no condition", which
//! compiles to a case-insensitive exact match.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Comparison kinds a filter can apply to a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Equals (=)
    Equals,
    /// Not equals (!)
    NotEquals,
    /// Case-insensitive substring
    Contains,
    /// Case-insensitive prefix
    StartsWith,
    /// Case-insensitive suffix
    EndsWith,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessOrEqual,
}

impl Condition {
    /// Parse a condition from its wire token.
    ///
    /// Matching is case-insensitive and accepts both the symbolic tokens and
    /// the spelled-out names. Returns `None` for empty or unknown tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "=" | "EQUALS" => Some(Self::Equals),
            "!" | "NOT_EQUALS" | "NOTEQUALS" => Some(Self::NotEquals),
            "CONTAINS" => Some(Self::Contains),
            "STARTSWITH" | "STARTS_WITH" => Some(Self::StartsWith),
            "ENDSWITH" | "ENDS_WITH" => Some(Self::EndsWith),
            ">" | "GREATER_THAN" | "GREATERTHAN" => Some(Self::GreaterThan),
            ">=" | "GREATER_OR_EQUAL" | "GREATERTHANOREQUAL" => Some(Self::GreaterOrEqual),
            "<" | "LESS_THAN" | "LESSTHAN" => Some(Self::LessThan),
            "<=" | "LESS_OR_EQUAL" | "LESSTHANEQUAL" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    /// Wire token for this condition
    pub fn token(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!",
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTSWITH",
            Self::EndsWith => "ENDSWITH",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

/// Deserialize an optional condition token, mapping empty and unknown tokens to `None`.
pub fn deserialize_token<'de, D>(deserializer: D) -> Result<Option<Condition>, D::Error>
where
    D: Deserializer<'de>,
{
    let token: Option<String> = Option::deserialize(deserializer)?;
    Ok(token.as_deref().and_then(Condition::from_token))
}
