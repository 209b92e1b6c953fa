//! Resolved attribute values and the placeholder for missing ones.
//!
//! A check expression may navigate deep into an attribute before its own
//! assertion runs. When the attribute never received a value, that navigation
//! must not fail, so reads return [`AttributeValue::Unresolved`], whose
//! navigation methods always yield another unresolved placeholder.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Placeholder standing in for an attribute that has no resolved value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedAttribute {
    name: String,
}

impl UnresolvedAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name of the attribute this placeholder stands in for.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, _key: &str) -> Self {
        self.clone()
    }

    pub fn index(&self, _index: usize) -> Self {
        self.clone()
    }

    /// Stand-in for any method a check would call on a real value.
    pub fn call(&self, _method: &str) -> Self {
        self.clone()
    }
}

impl fmt::Display for UnresolvedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attribute '{}' does not have a value. Skipping test.", self.name)
    }
}

/// Outcome of reading an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// The winning contribution's value. May legitimately be `null` or `false`.
    Resolved(Value),
    /// No contribution ever set a value.
    Unresolved(UnresolvedAttribute),
}

impl AttributeValue {
    pub fn is_resolved(&self) -> bool {
        matches!(self, AttributeValue::Resolved(_))
    }

    pub fn as_resolved(&self) -> Option<&Value> {
        match self {
            AttributeValue::Resolved(value) => Some(value),
            AttributeValue::Unresolved(_) => None,
        }
    }

    pub fn into_resolved(self) -> Option<Value> {
        match self {
            AttributeValue::Resolved(value) => Some(value),
            AttributeValue::Unresolved(_) => None,
        }
    }

    /// True for `Resolved(null)` and for the placeholder.
    pub fn is_null_or_unresolved(&self) -> bool {
        match self {
            AttributeValue::Resolved(value) => value.is_null(),
            AttributeValue::Unresolved(_) => true,
        }
    }

    /// Looks up `key` in a resolved object. Missing keys and non-objects yield `null`.
    pub fn field(&self, key: &str) -> AttributeValue {
        match self {
            AttributeValue::Resolved(value) => AttributeValue::Resolved(value.get(key).cloned().unwrap_or(Value::Null)),
            AttributeValue::Unresolved(unresolved) => AttributeValue::Unresolved(unresolved.field(key)),
        }
    }

    /// Looks up position `index` in a resolved array. Out of range and non-arrays yield `null`.
    pub fn index(&self, index: usize) -> AttributeValue {
        match self {
            AttributeValue::Resolved(value) => AttributeValue::Resolved(value.get(index).cloned().unwrap_or(Value::Null)),
            AttributeValue::Unresolved(unresolved) => AttributeValue::Unresolved(unresolved.index(index)),
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        AttributeValue::Resolved(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Resolved(Value::String(text)) => f.write_str(text),
            AttributeValue::Resolved(value) => write!(f, "{}", value),
            AttributeValue::Unresolved(unresolved) => write!(f, "{}", unresolved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unresolved_survives_arbitrary_navigation() {
        let value = AttributeValue::Unresolved(UnresolvedAttribute::new("test_attribute"));
        let navigated = value.field("hello").field("world").index(1).index(2).field("three");
        assert_eq!(navigated, value);
        assert_eq!(
            navigated.to_string(),
            "Attribute 'test_attribute' does not have a value. Skipping test."
        );
    }

    #[test]
    fn unresolved_method_chain_keeps_name() {
        let placeholder = UnresolvedAttribute::new("port");
        let chained = placeholder.call("some").call("fancy").call("functions");
        assert_eq!(chained.name(), "port");
    }

    #[test]
    fn resolved_navigation_reads_json() {
        let value = AttributeValue::Resolved(json!({"users": [{"name": "root"}]}));
        assert_eq!(value.field("users").index(0).field("name"), AttributeValue::Resolved(json!("root")));
        assert_eq!(value.field("absent").index(3), AttributeValue::Resolved(Value::Null));
    }

    #[test]
    fn null_counts_as_missing_for_required_checks() {
        assert!(AttributeValue::Resolved(Value::Null).is_null_or_unresolved());
        assert!(!AttributeValue::Resolved(json!(false)).is_null_or_unresolved());
        assert!(AttributeValue::Unresolved(UnresolvedAttribute::new("x")).is_null_or_unresolved());
    }
}
