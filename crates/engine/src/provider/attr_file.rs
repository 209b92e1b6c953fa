//! Attribute files passed on the command line via `--attrs`.
//!
//! A file is YAML (JSON is accepted too) whose top level maps attribute names
//! to arbitrary values. Missing or unreadable files are hard errors; a file
//! whose top level is not a mapping is skipped with a warning so the rest of
//! the batch still loads.
//!
//! Parsing is strict: a duplicated top-level key, or a nested map whose key
//! cannot become a JSON object key (such as `~`), rejects the whole file with
//! [`AttributeError::AttributesFileUnparseable`] rather than guessing.

use std::{fs, io::ErrorKind, path::Path};

use serde_json::Value;
use serde_yaml::Value as YamlValue;
use tracing::{debug, warn};

use super::ValueProvider;
use crate::{error::AttributeError, event::ContributionEvent, options::AttributeOptions};

pub const ATTR_FILE_PROVIDER: &str = "attr_file";

/// Values from attribute files are relatively high priority.
pub const ATTR_FILE_PRIORITY: u8 = 40;

#[derive(Debug, Default)]
pub struct AttrFileProvider;

impl AttrFileProvider {
    /// Reads `path` and returns one contribution per top-level key.
    ///
    /// Nothing is returned unless the whole file was read and parsed, so a
    /// failing file never registers a partial set of attributes.
    pub fn load_attribute_file(&self, profile_name: &str, path: &Path) -> Result<Vec<(String, AttributeOptions)>, AttributeError> {
        let content = read_attribute_file(path)?;
        let document: YamlValue = serde_yaml::from_str(&content).map_err(|error| AttributeError::AttributesFileUnparseable {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

        let YamlValue::Mapping(mapping) = document else {
            warn!(
                path = %path.display(),
                "unable to parse attributes file: invalid YAML or contents are not a mapping; skipping"
            );
            return Ok(Vec::new());
        };

        let file = path.display().to_string();
        let mut contributions = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Some(attribute_name) = key_to_name(&key) else {
                warn!(path = %file, key = ?key, "skipping attribute with a non-scalar name");
                continue;
            };
            let value: Value = serde_json::to_value(&value).map_err(|error| AttributeError::AttributesFileUnparseable {
                path: path.to_path_buf(),
                message: format!("attribute '{}': {}", attribute_name, error),
            })?;
            let priority = self.priority_for_attribute(&attribute_name, profile_name);
            let event = ContributionEvent::new(ATTR_FILE_PROVIDER, i32::from(priority))
                .with_profile(profile_name)
                .with_value(value)
                .with_file(file.clone());
            contributions.push((attribute_name, AttributeOptions::new().with_event(event)));
        }

        debug!(
            path = %file,
            profile = %profile_name,
            attribute_count = contributions.len(),
            "loaded attributes file"
        );
        Ok(contributions)
    }
}

impl ValueProvider for AttrFileProvider {
    /// File values are pushed at ingestion time; nothing is fetched on demand.
    fn fetch_value(&self, _attribute_name: &str, _profile_name: &str, _options: &AttributeOptions) -> Option<Value> {
        None
    }

    fn annotate_attribute_options(&self, _attribute_name: &str, options: AttributeOptions) -> AttributeOptions {
        options
    }

    fn priority_for_attribute(&self, _attribute_name: &str, _profile_name: &str) -> u8 {
        ATTR_FILE_PRIORITY
    }

    fn load_source(&self, profile_name: &str, path: &Path) -> Result<Vec<(String, AttributeOptions)>, AttributeError> {
        self.load_attribute_file(profile_name, path)
    }
}

fn read_attribute_file(path: &Path) -> Result<String, AttributeError> {
    match fs::metadata(path) {
        Ok(_) => {}
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(AttributeError::AttributesFileDoesNotExist { path: path.to_path_buf() });
        }
        Err(source) => {
            return Err(AttributeError::AttributesFileNotReadable {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    fs::read_to_string(path).map_err(|source| AttributeError::AttributesFileNotReadable {
        path: path.to_path_buf(),
        source,
    })
}

fn key_to_name(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(name) => Some(name.clone()),
        YamlValue::Number(number) => Some(number.to_string()),
        YamlValue::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
