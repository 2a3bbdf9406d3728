use std::fmt;

use serde::{Deserialize, Serialize};

/// A selected attribute value as supplied by the caller.
///
/// Conditions never compare typed values directly: a selection matches a
/// condition only when its [string form](Value::as_text) equals the expected
/// value exactly. The variants exist so that numeric and boolean selections
/// coming from a UI layer render the same way a server-side evaluator would.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
}

impl Value {
    /// The exact textual rendering used for condition matching and
    /// allowed-value membership.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Whether the string form of this value equals `expected` exactly.
    /// Case-sensitive, no trimming or normalization.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            Value::String(s) => s == expected,
            other => other.to_string() == expected,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}
