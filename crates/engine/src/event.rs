//! Contribution events: immutable proposals of a value for an attribute.
//!
//! Each source that wants to influence an attribute appends one event. The
//! event records the proposed value (if any), the priority it competes with,
//! and where it came from, so the full history stays available for
//! diagnostics after a winner has been chosen.

use std::panic::Location;

use serde::Serialize;
use serde_json::Value;

/// Priority given to events synthesized for callers that did not supply one.
pub const DEFAULT_PRIORITY_FOR_UNKNOWN_CALLER: i32 = 10;

/// Priority conventionally used by profile-level declarations.
pub const DEFAULT_PRIORITY_FOR_DSL_ATTRIBUTES: i32 = 20;

/// Priority of direct `set_value` overrides. Highest in core; providers may go higher.
pub const DEFAULT_PRIORITY_FOR_VALUE_SET: i32 = 60;

/// One proposed value for an attribute together with its provenance.
///
/// `value` distinguishes "no value proposed" (`None`) from "value proposed as
/// null" (`Some(Value::Null)`); both `null` and `false` count as set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionEvent {
    provider: String,
    priority: i32,
    profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
}

impl ContributionEvent {
    /// Starts an event for `provider` at `priority` with no value and unknown origin.
    pub fn new(provider: impl Into<String>, priority: i32) -> Self {
        Self {
            provider: provider.into(),
            priority,
            profile: "unknown".to_string(),
            value: None,
            file: None,
            line: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Marks the event as setting `value`, even when it is `null` or `false`.
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

    /// Stamps file and line from a source location captured with `#[track_caller]`.
    pub fn with_location(self, location: &Location<'_>) -> Self {
        self.with_file(location.file()).with_line(location.line())
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// The proposed value, or `None` when the event only carries metadata.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn value_has_been_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Human-readable origin, e.g. `attrs.yml:4` or `attr_file` when no file is known.
    pub fn source_label(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.clone(),
            (None, _) => self.provider.clone(),
        }
    }
}
