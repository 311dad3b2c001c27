//! Category-dependent listing attributes.
//!
//! The attribute schema varies per category and is managed outside this crate, so
//! values are stored as a small tagged union instead of free-form JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered attribute mapping; ordering keeps serialized payloads stable.
pub type Attributes = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// String form used when matching `attr_*` search parameters.
    pub fn match_string(&self) -> String {
        self.to_string()
    }

    /// Whether a supplied filter value selects this attribute value.
    ///
    /// Numbers also match any numerically equal spelling (`2019.0` for `2019`).
    pub fn matches(&self, supplied: &str) -> bool {
        if self.match_string() == supplied {
            return true;
        }
        match self {
            AttributeValue::Number(value) => supplied
                .parse::<f64>()
                .is_ok_and(|parsed| parsed.is_finite() && parsed == *value),
            AttributeValue::Bool(_) | AttributeValue::Text(_) => false,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(value) => write!(f, "{value}"),
            AttributeValue::Number(value) => write!(f, "{value}"),
            AttributeValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}
