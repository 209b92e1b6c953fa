//! # Ward Engine
//!
//! Resolves named attributes (inputs) consumed by compliance checks. Many
//! independent sources can propose a value for the same attribute of a
//! profile: profile metadata, `--attrs` files, an embedding caller, and value
//! provider plugins. The engine keeps every proposal, picks one winner
//! deterministically, optionally enforces a declared type, and hands back a
//! navigable placeholder when no value exists.
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use ward_engine::{AttributeOptions, AttributeStore, AttributeValue, EvaluationMode};
//!
//! let mut store = AttributeStore::new(EvaluationMode::Exec);
//! store.find_or_define_attribute("color", "p1", AttributeOptions::new().with_value(json!("silver")).with_priority(10))?;
//! store.find_or_define_attribute("color", "p1", AttributeOptions::new().with_value(json!("gold")).with_priority(20))?;
//!
//! assert_eq!(store.value_of("color", "p1")?, AttributeValue::Resolved(json!("gold")));
//! # Ok::<(), ward_engine::AttributeError>(())
//! ```
//!
//! ## Architecture
//!
//! - **`event`**: immutable contribution events and priority constants
//! - **`value`**: resolved values and the unresolved placeholder
//! - **`attribute_type`**: type restriction vocabulary and validation
//! - **`attribute`**: one attribute and its resolution algorithm
//! - **`provider`**: the value provider trait, registry, and core providers
//! - **`store`**: per-run attribute store with profile aliases

pub mod attribute;
pub mod attribute_type;
pub mod context;
pub mod error;
pub mod event;
pub mod options;
pub mod provider;
pub mod store;
pub mod value;

pub use attribute::{Attribute, AttributeExport};
pub use attribute_type::AttributeType;
pub use context::EvaluationMode;
pub use error::AttributeError;
pub use event::{
    ContributionEvent, DEFAULT_PRIORITY_FOR_DSL_ATTRIBUTES, DEFAULT_PRIORITY_FOR_UNKNOWN_CALLER, DEFAULT_PRIORITY_FOR_VALUE_SET,
};
pub use options::{AttributeOptions, IngestionOptions};
pub use provider::{AttrFileProvider, ProviderRegistry, RunnerApiProvider, ValueProvider};
pub use store::{AttributeStore, SharedAttributeStore};
pub use value::{AttributeValue, UnresolvedAttribute};
