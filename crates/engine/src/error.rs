//! Error surface of the attribute engine.
//!
//! Every failure is a distinct, structured variant so the hosting check
//! executor can match on the kind and render the carried names directly into
//! a diagnostic message.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while registering, ingesting, or reading attributes.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// An attribute file passed via `--attrs` does not exist.
    #[error("Cannot find attributes file '{}'. Check to make sure file exists.", path.display())]
    AttributesFileDoesNotExist { path: PathBuf },

    /// An attribute file exists but could not be opened or read.
    #[error("Cannot read attributes file '{}'. Check to make sure file is readable.", path.display())]
    AttributesFileNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An attribute file was read but is not valid YAML or JSON.
    #[error("Error reading attributes file '{}': {message}", path.display())]
    AttributesFileUnparseable { path: PathBuf, message: String },

    /// Lookup of an attribute that was never registered in the profile.
    #[error("Profile '{profile_name}' does not have an attribute with name '{attribute_name}'")]
    AttributeNotFound { attribute_name: String, profile_name: String },

    /// A required attribute has no value while checks are being executed.
    #[error("Attribute '{attribute_name}' is required and does not have a value.")]
    RequiredError { attribute_name: String },

    /// A type restriction names a type outside the supported vocabulary.
    #[error("Type '{type_name}' is not a valid attribute type.")]
    TypeError { type_name: String },

    /// A proposed value does not satisfy the attribute's type restriction.
    #[error("Attribute '{attribute_name}' with value '{}' does not validate to type '{type_name}'.", display_value(value))]
    ValidationError {
        attribute_name: String,
        value: Value,
        type_name: String,
    },

    /// No provider factory was registered under the requested name.
    #[error("No value provider registered with name '{provider_name}'")]
    ProviderNotFound { provider_name: String },
}

/// Renders strings without JSON quoting so messages read `'abc'`, not `'"abc"'`.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
