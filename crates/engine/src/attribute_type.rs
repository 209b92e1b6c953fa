//! Declared type restrictions and value validation.

use std::{fmt, str::FromStr};

use fancy_regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::AttributeError;

/// The closed vocabulary of attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeType {
    String,
    Numeric,
    Regexp,
    Array,
    Hash,
    Boolean,
    Any,
}

impl AttributeType {
    /// Canonical, capitalized name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "String",
            AttributeType::Numeric => "Numeric",
            AttributeType::Regexp => "Regexp",
            AttributeType::Array => "Array",
            AttributeType::Hash => "Hash",
            AttributeType::Boolean => "Boolean",
            AttributeType::Any => "Any",
        }
    }

    /// Returns whether `value` satisfies this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeType::Any => true,
            AttributeType::String => value.is_string(),
            AttributeType::Array => value.is_array(),
            AttributeType::Hash => value.is_object(),
            AttributeType::Boolean => value.is_boolean(),
            AttributeType::Numeric => is_numeric(value),
            AttributeType::Regexp => value.as_str().is_some_and(is_valid_regexp),
        }
    }

    /// Fails with `ValidationError` when `value` does not satisfy this type.
    pub fn validate(&self, attribute_name: &str, value: &Value) -> Result<(), AttributeError> {
        if self.accepts(value) {
            return Ok(());
        }
        Err(AttributeError::ValidationError {
            attribute_name: attribute_name.to_string(),
            value: value.clone(),
            type_name: self.as_str().to_string(),
        })
    }
}

impl FromStr for AttributeType {
    type Err = AttributeError;

    /// Parses a type name case-insensitively, accepting `num` and `regex` as synonyms.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = capitalize(raw.trim());
        let parsed = match normalized.as_str() {
            "String" => AttributeType::String,
            "Numeric" | "Num" => AttributeType::Numeric,
            "Regexp" | "Regex" => AttributeType::Regexp,
            "Array" => AttributeType::Array,
            "Hash" => AttributeType::Hash,
            "Boolean" => AttributeType::Boolean,
            "Any" => AttributeType::Any,
            _ => return Err(AttributeError::TypeError { type_name: normalized }),
        };
        Ok(parsed)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(text) => text.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}

/// Accepts bare patterns and `/pattern/` literals, including lookaround and backreferences.
fn is_valid_regexp(pattern: &str) -> bool {
    let body = pattern
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
        .unwrap_or(pattern);
    Regex::new(body).is_ok()
}
