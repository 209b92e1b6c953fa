//! Options accepted when registering or updating an attribute.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::event::ContributionEvent;

/// Metadata and an optional value contribution for one attribute.
///
/// Every field is optional. Metadata fields that are present overwrite the
/// attribute's current metadata; absent fields leave it untouched. When
/// `event` is absent, an event is synthesized from `value`, `priority`,
/// `profile`, `file` and `line`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttributeOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub identifier: Option<String>,
    /// Type restriction name, e.g. `"string"`, `"num"`, `"regex"`.
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub priority: Option<i32>,
    pub profile: Option<String>,
    /// Proposed value. `Some(Value::Null)` proposes null; `None` proposes nothing.
    #[serde(deserialize_with = "deserialize_present")]
    pub value: Option<Value>,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Fully-formed event; takes precedence over the synthesized one.
    #[serde(skip)]
    pub event: Option<ContributionEvent>,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.r#type = Some(type_name.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_event(mut self, event: ContributionEvent) -> Self {
        self.event = Some(event);
        self
    }
}

/// Keeps an explicit `value: null` as `Some(Value::Null)` instead of collapsing it to `None`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Inputs collected by the command line for bulk ingestion.
#[derive(Debug, Clone, Default)]
pub struct IngestionOptions {
    /// Attribute files passed via `--attrs`, loaded in order.
    pub attrs: Vec<PathBuf>,
}
