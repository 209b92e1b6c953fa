//! The attribute store: every attribute of every profile in one evaluation run.
//!
//! The store is the single place where sources meet. Checks, bulk ingestion,
//! embedding callers and value providers all go through
//! [`AttributeStore::find_or_define_attribute`], which creates the attribute
//! on first reference and appends a contribution on every call. Reads go
//! through [`AttributeStore::find_attribute`] or [`AttributeStore::value_of`].
//!
//! Profiles may be known under an alias. Lookups of a profile that has no
//! bucket of its own are redirected through the alias table before a new
//! bucket is created.

use std::{
    collections::HashMap,
    panic::Location,
    sync::{Arc, Mutex},
};

use indexmap::{IndexMap, map::Entry as IndexMapEntry};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    attribute::Attribute,
    context::EvaluationMode,
    error::AttributeError,
    event::{ContributionEvent, DEFAULT_PRIORITY_FOR_VALUE_SET},
    options::{AttributeOptions, IngestionOptions},
    provider::{ATTR_FILE_PROVIDER, ProviderRegistry, RUNNER_API_PROVIDER},
    value::AttributeValue,
};

/// Store shared between threads evaluating different profiles.
///
/// A single coarse lock guards all buckets and the alias table; resolution
/// order inside an attribute is unchanged.
pub type SharedAttributeStore = Arc<Mutex<AttributeStore>>;

#[derive(Debug)]
pub struct AttributeStore {
    attributes_by_profile: IndexMap<String, IndexMap<String, Attribute>>,
    profile_aliases: HashMap<String, String>,
    providers: ProviderRegistry,
    mode: EvaluationMode,
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new(EvaluationMode::default())
    }
}

impl AttributeStore {
    /// Store for one evaluation run with the core providers registered.
    pub fn new(mode: EvaluationMode) -> Self {
        Self::with_providers(mode, ProviderRegistry::with_core_providers())
    }

    pub fn with_providers(mode: EvaluationMode, providers: ProviderRegistry) -> Self {
        Self {
            attributes_by_profile: IndexMap::new(),
            profile_aliases: HashMap::new(),
            providers,
            mode,
        }
    }

    pub fn into_shared(self) -> SharedAttributeStore {
        Arc::new(Mutex::new(self))
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EvaluationMode) {
        self.mode = mode;
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn providers_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.providers
    }

    pub fn profile_known(&self, profile: &str) -> bool {
        self.attributes_by_profile.contains_key(profile)
    }

    /// Profiles with a bucket, in first-reference order.
    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.attributes_by_profile.keys().map(String::as_str)
    }

    /// Redirects lookups of `alias_name` to `canonical_name`. Last write wins.
    pub fn register_profile_alias(&mut self, canonical_name: impl Into<String>, alias_name: impl Into<String>) {
        let canonical_name = canonical_name.into();
        let alias_name = alias_name.into();
        debug!(alias = %alias_name, canonical = %canonical_name, "registered profile alias");
        self.profile_aliases.insert(alias_name, canonical_name);
    }

    /// Finds `name` in `profile`, creating the bucket and attribute if needed,
    /// then applies `options` as an update.
    ///
    /// Repeated calls accumulate contributions and merge metadata. If the
    /// update fails, a freshly created attribute is not kept.
    #[track_caller]
    pub fn find_or_define_attribute(
        &mut self,
        name: &str,
        profile: &str,
        options: AttributeOptions,
    ) -> Result<&Attribute, AttributeError> {
        self.define_with_caller(name, profile, options, Location::caller())
    }

    /// Alias of [`find_or_define_attribute`](Self::find_or_define_attribute).
    #[track_caller]
    pub fn register_attribute(&mut self, name: &str, profile: &str, options: AttributeOptions) -> Result<&Attribute, AttributeError> {
        self.define_with_caller(name, profile, options, Location::caller())
    }

    fn define_with_caller(
        &mut self,
        name: &str,
        profile: &str,
        options: AttributeOptions,
        caller: &Location<'_>,
    ) -> Result<&Attribute, AttributeError> {
        let profile = self.resolve_profile(profile).to_string();
        let bucket = self.attributes_by_profile.entry(profile.clone()).or_default();

        match bucket.entry(name.to_string()) {
            IndexMapEntry::Occupied(entry) => {
                let attribute = entry.into_mut();
                attribute.apply_update(options, caller)?;
                Ok(attribute)
            }
            IndexMapEntry::Vacant(entry) => {
                let mut attribute = Attribute::empty(name);
                attribute.apply_update(options, caller)?;
                debug!(attribute = %name, profile = %profile, "defined attribute");
                Ok(entry.insert(attribute))
            }
        }
    }

    /// Looks up an existing attribute.
    pub fn find_attribute(&self, name: &str, profile: &str) -> Result<&Attribute, AttributeError> {
        let profile = self.resolve_profile(profile);
        self.attributes_by_profile
            .get(profile)
            .and_then(|bucket| bucket.get(name))
            .ok_or_else(|| AttributeError::AttributeNotFound {
                attribute_name: name.to_string(),
                profile_name: profile.to_string(),
            })
    }

    fn find_attribute_mut(&mut self, name: &str, profile: &str) -> Result<&mut Attribute, AttributeError> {
        let profile = self.resolve_profile(profile).to_string();
        self.attributes_by_profile
            .get_mut(&profile)
            .and_then(|bucket| bucket.get_mut(name))
            .ok_or(AttributeError::AttributeNotFound {
                attribute_name: name.to_string(),
                profile_name: profile,
            })
    }

    /// Attributes of `profile`, keyed by name in definition order.
    ///
    /// An alias lists its canonical profile. Listing an unknown profile
    /// creates its empty bucket, exactly as any other first reference would.
    pub fn list_attributes_for_profile(&mut self, profile: &str) -> &IndexMap<String, Attribute> {
        let profile = self.resolve_profile(profile).to_string();
        self.attributes_by_profile.entry(profile).or_default()
    }

    /// Reads the value of an existing attribute under the store's evaluation mode.
    pub fn value_of(&self, name: &str, profile: &str) -> Result<AttributeValue, AttributeError> {
        self.find_attribute(name, profile)?.value(self.mode)
    }

    /// Programmatic override of an existing attribute.
    #[track_caller]
    pub fn set_value(
        &mut self,
        name: &str,
        profile: &str,
        value: Value,
        priority: Option<i32>,
    ) -> Result<AttributeValue, AttributeError> {
        let caller = Location::caller();
        let attribute = self.find_attribute_mut(name, profile)?;
        attribute.push_value_setter_event(value, priority.unwrap_or(DEFAULT_PRIORITY_FOR_VALUE_SET), caller)
    }

    /// Registers attributes that originate outside the profile, driven by `--attrs`.
    ///
    /// Files load in order. A file that fails aborts the call before any of
    /// its attributes are registered; files loaded earlier stay registered.
    pub fn register_external_attributes(&mut self, profile: &str, options: &IngestionOptions) -> Result<(), AttributeError> {
        let canonical = self.resolve_profile(profile).to_string();
        self.attributes_by_profile.entry(canonical.clone()).or_default();
        if options.attrs.is_empty() {
            return Ok(());
        }

        for path in &options.attrs {
            let contributions = self.providers.activate(ATTR_FILE_PROVIDER)?.load_source(&canonical, path)?;
            info!(
                path = %path.display(),
                profile = %canonical,
                attribute_count = contributions.len(),
                "registering attributes from file"
            );
            for (name, attribute_options) in contributions {
                self.find_or_define_attribute(&name, &canonical, attribute_options)?;
            }
        }
        Ok(())
    }

    /// Registers a bare `name → value` map supplied by an embedding caller.
    ///
    /// Each contribution records the caller's source location.
    #[track_caller]
    pub fn register_api_attributes(&mut self, profile: &str, attributes: &IndexMap<String, Value>) -> Result<(), AttributeError> {
        let caller = Location::caller();
        if attributes.is_empty() {
            return Ok(());
        }
        let profile = self.resolve_profile(profile).to_string();

        let annotated: Vec<(String, AttributeOptions)> = {
            let provider = self.providers.activate(RUNNER_API_PROVIDER)?;
            attributes
                .iter()
                .map(|(name, value)| {
                    let options = AttributeOptions::new()
                        .with_profile(profile.clone())
                        .with_value(value.clone())
                        .with_file(caller.file())
                        .with_line(caller.line());
                    (name.clone(), provider.annotate_attribute_options(name, options))
                })
                .collect()
        };

        for (name, options) in annotated {
            self.define_with_caller(&name, &profile, options, caller)?;
        }
        Ok(())
    }

    /// Asks every registered provider, in registration order, for a value.
    ///
    /// Each value returned becomes a contribution at that provider's priority.
    /// Returns how many contributions were registered.
    pub fn fetch_from_providers(&mut self, name: &str, profile: &str) -> Result<usize, AttributeError> {
        let profile = self.resolve_profile(profile).to_string();
        let lookup_options = AttributeOptions::new().with_profile(profile.clone());

        let mut contributions = Vec::new();
        for provider_name in self.providers.names() {
            let provider = self.providers.activate(provider_name)?;
            let Some(value) = provider.fetch_value(name, &profile, &lookup_options) else {
                continue;
            };
            let priority = provider.priority_for_attribute(name, &profile);
            let event = ContributionEvent::new(provider_name, i32::from(priority))
                .with_profile(profile.clone())
                .with_value(value);
            contributions.push(provider.annotate_attribute_options(name, AttributeOptions::new().with_event(event)));
        }

        let registered = contributions.len();
        for options in contributions {
            self.find_or_define_attribute(name, &profile, options)?;
        }
        debug!(attribute = %name, profile = %profile, registered, "fetched attribute from providers");
        Ok(registered)
    }

    /// Clears every profile and alias. Intended for test isolation only.
    #[doc(hidden)]
    pub fn reset(&mut self) {
        self.attributes_by_profile.clear();
        self.profile_aliases.clear();
    }

    fn resolve_profile<'a>(&'a self, profile: &'a str) -> &'a str {
        if self.profile_known(profile) {
            return profile;
        }
        self.profile_aliases.get(profile).map(String::as_str).unwrap_or(profile)
    }
}
