//! Values handed over by a program embedding the engine.
//!
//! Wrapping tools pass a plain `name → value` map. This provider only stamps
//! provenance and priority; the store performs the actual registration.

use serde_json::Value;

use super::ValueProvider;
use crate::{event::ContributionEvent, options::AttributeOptions};

pub const RUNNER_API_PROVIDER: &str = "runner_api";

pub const RUNNER_API_PRIORITY: u8 = 40;

#[derive(Debug, Default)]
pub struct RunnerApiProvider;

impl ValueProvider for RunnerApiProvider {
    fn fetch_value(&self, _attribute_name: &str, _profile_name: &str, _options: &AttributeOptions) -> Option<Value> {
        None
    }

    /// Replaces any synthesized provenance with a `runner_api` event. Options
    /// that already carry an explicit event are left alone.
    fn annotate_attribute_options(&self, attribute_name: &str, mut options: AttributeOptions) -> AttributeOptions {
        if options.event.is_some() {
            return options;
        }
        let profile = options.profile.clone().unwrap_or_else(|| "unknown".to_string());
        let priority = options
            .priority
            .unwrap_or_else(|| i32::from(self.priority_for_attribute(attribute_name, &profile)));

        let mut event = ContributionEvent::new(RUNNER_API_PROVIDER, priority).with_profile(profile);
        if let Some(file) = &options.file {
            event = event.with_file(file.clone());
        }
        if let Some(line) = options.line {
            event = event.with_line(line);
        }
        if let Some(value) = &options.value {
            event = event.with_value(value.clone());
        }
        options.event = Some(event);
        options
    }

    fn priority_for_attribute(&self, _attribute_name: &str, _profile_name: &str) -> u8 {
        RUNNER_API_PRIORITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stamps_runner_api_provenance() {
        let options = AttributeOptions::new().with_profile("p1").with_value(json!("from-kitchen"));
        let annotated = RunnerApiProvider.annotate_attribute_options("color", options);
        let event = annotated.event.expect("event stamped");
        assert_eq!(event.provider(), RUNNER_API_PROVIDER);
        assert_eq!(event.priority(), 40);
        assert_eq!(event.profile(), "p1");
        assert_eq!(event.value(), Some(&json!("from-kitchen")));
        assert_eq!(event.source_label(), RUNNER_API_PROVIDER);
    }

    #[test]
    fn keeps_explicit_events() {
        let explicit = ContributionEvent::new("custom", 75).with_value(json!(1));
        let options = AttributeOptions::new().with_event(explicit.clone());
        let annotated = RunnerApiProvider.annotate_attribute_options("x", options);
        assert_eq!(annotated.event, Some(explicit));
    }
}
