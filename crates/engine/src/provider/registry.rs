use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use super::{ATTR_FILE_PROVIDER, AttrFileProvider, RUNNER_API_PROVIDER, RunnerApiProvider, ValueProvider};
use crate::error::AttributeError;

/// Constructor for a provider, invoked at most once per registry entry.
pub type ProviderFactory = Box<dyn Fn() -> Box<dyn ValueProvider> + Send + Sync>;

struct ProviderEntry {
    factory: ProviderFactory,
    instance: OnceCell<Box<dyn ValueProvider>>,
}

/// Typed table of value providers keyed by name.
///
/// Factories are registered up front; a provider is only instantiated the
/// first time it is activated, and the same instance is handed out for the
/// lifetime of the registry. Iteration follows registration order.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: IndexMap<String, ProviderEntry>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let activated: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.instance.get().is_some())
            .map(|(name, _)| name.as_str())
            .collect();
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.entries.keys().collect::<Vec<_>>())
            .field("activated", &activated)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `attr_file` and `runner_api` providers.
    pub fn with_core_providers() -> Self {
        let mut registry = Self::new();
        registry.register(ATTR_FILE_PROVIDER, || Box::new(AttrFileProvider));
        registry.register(RUNNER_API_PROVIDER, || Box::new(RunnerApiProvider));
        registry
    }

    /// Registers `factory` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn ValueProvider> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(provider = %name, "registered value provider");
        self.entries.insert(
            name,
            ProviderEntry {
                factory: Box::new(factory),
                instance: OnceCell::new(),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_activated(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|entry| entry.instance.get().is_some())
    }

    /// Provider names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the provider registered under `name`, instantiating it on first use.
    pub fn activate(&self, name: &str) -> Result<&dyn ValueProvider, AttributeError> {
        let entry = self.entries.get(name).ok_or_else(|| AttributeError::ProviderNotFound {
            provider_name: name.to_string(),
        })?;
        let provider = entry.instance.get_or_init(|| {
            info!(provider = %name, "activating value provider");
            (entry.factory)()
        });
        Ok(provider.as_ref())
    }
}
