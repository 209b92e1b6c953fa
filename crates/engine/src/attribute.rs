//! A single named attribute and its value-resolution algorithm.
//!
//! An [`Attribute`] never stores its value directly. Every source that wants
//! to influence it appends a [`ContributionEvent`]; reading the value picks
//! the winning event from that history each time:
//!
//! 1. only events that proposed a value compete (a proposal of `null` or
//!    `false` still competes);
//! 2. the highest priority wins;
//! 3. among equal priorities the earliest registered event wins.
//!
//! When no event proposed a value the result is the
//! [`Unresolved`](AttributeValue::Unresolved) placeholder.

use std::{
    panic::Location,
    sync::atomic::{AtomicBool, Ordering},
};

use serde::Serialize;
use serde_json::{Map as JsonMap, Value};
use tracing::warn;

use crate::{
    attribute_type::AttributeType,
    context::EvaluationMode,
    error::AttributeError,
    event::{ContributionEvent, DEFAULT_PRIORITY_FOR_UNKNOWN_CALLER, DEFAULT_PRIORITY_FOR_VALUE_SET},
    options::AttributeOptions,
    value::{AttributeValue, UnresolvedAttribute},
};

/// Provider name stamped on events created by [`Attribute::set_value`].
pub const VALUE_SETTER_PROVIDER: &str = "value_setter";

/// Provider name stamped on events synthesized from bare options.
pub const UNKNOWN_PROVIDER: &str = "unknown";

#[derive(Debug)]
pub struct Attribute {
    name: String,
    type_restriction: Option<AttributeType>,
    required: bool,
    title: Option<String>,
    description: Option<String>,
    identifier: Option<String>,
    events: Vec<ContributionEvent>,
    missing_value_warned: AtomicBool,
}

/// Serializable summary of an attribute, as exported into profile metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeExport {
    pub name: String,
    pub options: JsonMap<String, Value>,
}

impl Attribute {
    /// Creates an attribute and applies `options` as its first update.
    #[track_caller]
    pub fn new(name: impl Into<String>, options: AttributeOptions) -> Result<Self, AttributeError> {
        let mut attribute = Self::empty(name);
        attribute.apply_update(options, Location::caller())?;
        Ok(attribute)
    }

    pub(crate) fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_restriction: None,
            required: false,
            title: None,
            description: None,
            identifier: None,
            events: Vec::new(),
            missing_value_warned: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn type_restriction(&self) -> Option<AttributeType> {
        self.type_restriction
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// Every contribution in registration order.
    pub fn events(&self) -> &[ContributionEvent] {
        &self.events
    }

    /// Merges metadata and appends one contribution.
    ///
    /// The update is all-or-nothing: an unknown type name or a value that does
    /// not satisfy the effective type restriction returns an error and leaves
    /// the attribute exactly as it was.
    #[track_caller]
    pub fn update(&mut self, options: AttributeOptions) -> Result<(), AttributeError> {
        self.apply_update(options, Location::caller())
    }

    pub(crate) fn apply_update(&mut self, mut options: AttributeOptions, caller: &Location<'_>) -> Result<(), AttributeError> {
        let type_restriction = match options.r#type.as_deref() {
            Some(raw) => Some(raw.parse::<AttributeType>()?),
            None => self.type_restriction,
        };

        let event = match options.event.take() {
            Some(event) => event,
            None => synthesize_event(&options, caller),
        };

        if let (Some(restriction), Some(value)) = (type_restriction, event.value()) {
            restriction.validate(&self.name, value)?;
        }

        if let Some(title) = options.title {
            self.title = Some(title);
        }
        if let Some(description) = options.description {
            self.description = Some(description);
        }
        if let Some(required) = options.required {
            self.required = required;
        }
        if let Some(identifier) = options.identifier {
            self.identifier = Some(identifier);
        }
        self.type_restriction = type_restriction;
        self.events.push(event);
        Ok(())
    }

    /// The event whose value currently wins, if any event proposed one.
    pub fn winning_event(&self) -> Option<&ContributionEvent> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.value_has_been_set())
            // Equal priorities: the lower index (earlier registration) compares greater.
            .max_by(|(left_index, left), (right_index, right)| {
                left.priority()
                    .cmp(&right.priority())
                    .then_with(|| right_index.cmp(left_index))
            })
            .map(|(_, event)| event)
    }

    /// Resolves the value without any required-value enforcement.
    pub fn current_value(&self) -> AttributeValue {
        match self.winning_event().and_then(ContributionEvent::value) {
            Some(value) => AttributeValue::Resolved(value.clone()),
            None => AttributeValue::Unresolved(UnresolvedAttribute::new(&self.name)),
        }
    }

    /// Resolves the value for a check.
    ///
    /// Under [`EvaluationMode::Exec`] a required attribute resolving to `null`
    /// or to the placeholder fails with [`AttributeError::RequiredError`]; other
    /// modes tolerate missing input so static passes can run without it.
    pub fn value(&self, mode: EvaluationMode) -> Result<AttributeValue, AttributeError> {
        let current = self.current_value();
        if !mode.is_exec() {
            return Ok(current);
        }

        if self.required && current.is_null_or_unresolved() {
            return Err(AttributeError::RequiredError {
                attribute_name: self.name.clone(),
            });
        }

        if !current.is_resolved() && !self.missing_value_warned.swap(true, Ordering::Relaxed) {
            let name = &self.name;
            warn!(
                attribute = %name,
                "Attribute '{name}' does not have a value. Use --attrs to provide a value for '{name}' or specify a default value where it is declared."
            );
        }
        Ok(current)
    }

    /// Programmatic override at [`DEFAULT_PRIORITY_FOR_VALUE_SET`].
    #[track_caller]
    pub fn set_value(&mut self, new_value: Value) -> Result<AttributeValue, AttributeError> {
        self.push_value_setter_event(new_value, DEFAULT_PRIORITY_FOR_VALUE_SET, Location::caller())
    }

    /// Programmatic override at an explicit priority.
    #[track_caller]
    pub fn set_value_with_priority(&mut self, new_value: Value, priority: i32) -> Result<AttributeValue, AttributeError> {
        self.push_value_setter_event(new_value, priority, Location::caller())
    }

    pub(crate) fn push_value_setter_event(
        &mut self,
        new_value: Value,
        priority: i32,
        caller: &Location<'_>,
    ) -> Result<AttributeValue, AttributeError> {
        if let Some(restriction) = self.type_restriction {
            restriction.validate(&self.name, &new_value)?;
        }
        self.events.push(
            ContributionEvent::new(VALUE_SETTER_PROVIDER, priority)
                .with_value(new_value)
                .with_location(caller),
        );
        Ok(self.current_value())
    }

    /// Identifier usable as a variable name: the explicit identifier, or a slug of the name.
    pub fn variable_identifier(&self) -> String {
        if let Some(identifier) = &self.identifier {
            return identifier.clone();
        }
        let slug: String = self
            .name
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .chars()
            .filter(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == '-')
            .collect();
        format!("attr_{}", slug)
    }

    /// Exports the attribute as `{ name, options }` with the resolved value under `default`.
    pub fn to_export(&self) -> AttributeExport {
        let mut options = JsonMap::new();
        if let Some(title) = &self.title {
            options.insert("title".into(), Value::String(title.clone()));
        }
        let default = match self.current_value() {
            AttributeValue::Resolved(value) => value,
            AttributeValue::Unresolved(unresolved) => Value::String(unresolved.to_string()),
        };
        options.insert("default".into(), default);
        if let Some(description) = &self.description {
            options.insert("description".into(), Value::String(description.clone()));
        }
        if self.required {
            options.insert("required".into(), Value::Bool(true));
        }
        if let Some(identifier) = &self.identifier {
            options.insert("identifier".into(), Value::String(identifier.clone()));
        }
        AttributeExport {
            name: self.name.clone(),
            options,
        }
    }
}

fn synthesize_event(options: &AttributeOptions, caller: &Location<'_>) -> ContributionEvent {
    let mut event = ContributionEvent::new(
        UNKNOWN_PROVIDER,
        options.priority.unwrap_or(DEFAULT_PRIORITY_FOR_UNKNOWN_CALLER),
    );
    if let Some(profile) = &options.profile {
        event = event.with_profile(profile.clone());
    }
    event = match &options.file {
        Some(file) => {
            let event = event.with_file(file.clone());
            match options.line {
                Some(line) => event.with_line(line),
                None => event,
            }
        }
        None => event.with_location(caller),
    };
    if let Some(value) = &options.value {
        event = event.with_value(value.clone());
    }
    event
}
