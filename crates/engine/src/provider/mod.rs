//! Value providers and their registry.
//!
//! Modules:
//! - `registry`: name → factory table with lazy, one-time activation
//! - `attr_file`: provider for attribute files passed via `--attrs`
//! - `runner_api`: provider for values handed over by an embedding caller

mod attr_file;
mod registry;
mod runner_api;

use std::{fmt::Debug, path::Path};

use serde_json::Value;

use crate::{error::AttributeError, options::AttributeOptions};

pub use attr_file::{ATTR_FILE_PRIORITY, ATTR_FILE_PROVIDER, AttrFileProvider};
pub use registry::{ProviderFactory, ProviderRegistry};
pub use runner_api::{RUNNER_API_PRIORITY, RUNNER_API_PROVIDER, RunnerApiProvider};

/// Trait describing a source of attribute values.
///
/// Providers never write to the store themselves. They hand back values or
/// annotated options and the store turns those into contribution events, so
/// a provider stays unaware of every other source competing for the same
/// attribute.
pub trait ValueProvider: Send + Sync + Debug {
    /// Looks up a value for `attribute_name` in `profile_name`. `None` means "not found".
    fn fetch_value(&self, attribute_name: &str, profile_name: &str, options: &AttributeOptions) -> Option<Value>;

    /// Attaches provenance and priority to options before they are registered.
    fn annotate_attribute_options(&self, attribute_name: &str, options: AttributeOptions) -> AttributeOptions;

    /// Interest in servicing the attribute, 0–100. Higher numbers win.
    fn priority_for_attribute(&self, attribute_name: &str, profile_name: &str) -> u8;

    /// Reads one external source (e.g. a file) into `(attribute name, options)` pairs.
    ///
    /// Providers without a bulk source keep the default, which contributes nothing.
    fn load_source(&self, _profile_name: &str, _path: &Path) -> Result<Vec<(String, AttributeOptions)>, AttributeError> {
        Ok(Vec::new())
    }
}
