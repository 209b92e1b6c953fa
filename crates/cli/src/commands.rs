//! Store construction and rendering for the `resolve` and `trace` subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::debug;
use ward_engine::{Attribute, AttributeStore, AttributeValue, EvaluationMode, IngestionOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything needed to populate a store for one profile.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub profile: String,
    pub attrs: Vec<PathBuf>,
    /// `(alias, canonical)` pairs.
    pub aliases: Vec<(String, String)>,
    /// Values supplied with `--set`, registered through the embedding API provider.
    pub overrides: IndexMap<String, Value>,
    pub mode: EvaluationMode,
}

/// Builds a store for `request`: aliases first, then files, then overrides.
pub fn build_store(request: &RunRequest) -> Result<AttributeStore> {
    let mut store = AttributeStore::new(request.mode);
    for (alias, canonical) in &request.aliases {
        store.register_profile_alias(canonical.as_str(), alias.as_str());
    }

    let ingestion = IngestionOptions {
        attrs: request.attrs.clone(),
    };
    store
        .register_external_attributes(&request.profile, &ingestion)
        .with_context(|| format!("failed to load attributes for profile '{}'", request.profile))?;
    store
        .register_api_attributes(&request.profile, &request.overrides)
        .context("failed to register --set values")?;

    debug!(
        profile = %request.profile,
        file_count = request.attrs.len(),
        override_count = request.overrides.len(),
        mode = %request.mode,
        "attribute store ready"
    );
    Ok(store)
}

/// Parses a `--set` value as JSON, falling back to a plain string.
pub fn parse_override_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Renders every attribute of `profile` with its resolved value.
pub fn render_resolve(store: &mut AttributeStore, profile: &str, format: OutputFormat) -> Result<String> {
    let mode = store.mode();
    let mut rows = Vec::new();
    for (name, attribute) in store.list_attributes_for_profile(profile) {
        let value = attribute
            .value(mode)
            .with_context(|| format!("failed to resolve attribute '{}'", name))?;
        rows.push((attribute, value));
    }

    match format {
        OutputFormat::Json => {
            let entries: Vec<Value> = rows.iter().map(|(attribute, value)| resolved_entry(attribute, value)).collect();
            Ok(serde_json::to_string_pretty(&entries)?)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for (attribute, value) in rows {
                let origin = attribute
                    .winning_event()
                    .map(|event| format!("{} @ {} from {}", event.provider(), event.priority(), event.source_label()))
                    .unwrap_or_else(|| "no value".to_string());
                out.push_str(&format!("{} = {}  ({})\n", attribute.name(), render_value(&value), origin));
            }
            Ok(out)
        }
    }
}

/// Renders the contribution history of one attribute in registration order.
pub fn render_trace(store: &AttributeStore, profile: &str, name: &str, format: OutputFormat) -> Result<String> {
    let attribute = store.find_attribute(name, profile)?;
    let winner = attribute.winning_event();

    match format {
        OutputFormat::Json => {
            let trace = json!({
                "name": attribute.name(),
                "value": attribute.current_value(),
                "events": attribute.events(),
            });
            Ok(serde_json::to_string_pretty(&trace)?)
        }
        OutputFormat::Text => {
            let mut out = format!("{}\n", attribute.name());
            for (index, event) in attribute.events().iter().enumerate() {
                let marker = if winner.is_some_and(|winning| std::ptr::eq(winning, event)) { "*" } else { " " };
                let value = event.value().map(Value::to_string).unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "{} {:>2}. {:<12} priority {:>3}  {}  [{}]\n",
                    marker,
                    index + 1,
                    event.provider(),
                    event.priority(),
                    value,
                    event.source_label()
                ));
            }
            Ok(out)
        }
    }
}

fn resolved_entry(attribute: &Attribute, value: &AttributeValue) -> Value {
    let winner = attribute.winning_event();
    json!({
        "name": attribute.name(),
        "resolved": value.is_resolved(),
        "value": value.as_resolved(),
        "provider": winner.map(|event| event.provider()),
        "priority": winner.map(|event| event.priority()),
        "source": winner.map(|event| event.source_label()),
    })
}

fn render_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Resolved(resolved) => resolved.to_string(),
        AttributeValue::Unresolved(unresolved) => unresolved.to_string(),
    }
}
