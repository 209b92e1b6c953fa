use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::{Value, json};
use ward_engine::{
    AttributeError, AttributeOptions, AttributeStore, AttributeValue, ContributionEvent, EvaluationMode, IngestionOptions,
    ProviderRegistry, ValueProvider,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn contribution(priority: i32, value: Value) -> AttributeOptions {
    AttributeOptions::new().with_event(
        ContributionEvent::new("test_harness", priority)
            .with_profile("p1")
            .with_value(value),
    )
}

fn resolved(store: &AttributeStore, name: &str, profile: &str) -> Value {
    store
        .value_of(name, profile)
        .expect("attribute readable")
        .into_resolved()
        .expect("attribute resolved")
}

#[test]
fn silver_then_gold_resolves_to_gold() {
    let mut store = AttributeStore::new(EvaluationMode::Exec);
    store
        .find_or_define_attribute("color", "p1", AttributeOptions::new().with_value(json!("silver")).with_priority(10))
        .unwrap();
    store
        .find_or_define_attribute("color", "p1", AttributeOptions::new().with_value(json!("gold")).with_priority(20))
        .unwrap();
    assert_eq!(resolved(&store, "color", "p1"), json!("gold"));
}

#[test]
fn highest_priority_wins_for_every_insertion_order() {
    let proposals = [(10, "ten"), (35, "thirty-five"), (20, "twenty"), (5, "five")];
    let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 0, 3, 2], [2, 3, 0, 1]];

    for order in orders {
        let mut store = AttributeStore::default();
        for index in order {
            let (priority, value) = proposals[index];
            store.find_or_define_attribute("level", "p1", contribution(priority, json!(value))).unwrap();
        }
        assert_eq!(resolved(&store, "level", "p1"), json!("thirty-five"), "order {:?}", order);
    }
}

#[test]
fn equal_priority_keeps_earliest_registration() {
    let mut store = AttributeStore::default();
    for value in ["first", "second", "third"] {
        store.find_or_define_attribute("color", "p1", contribution(40, json!(value))).unwrap();
    }
    assert_eq!(resolved(&store, "color", "p1"), json!("first"));

    let attribute = store.find_attribute("color", "p1").unwrap();
    assert_eq!(attribute.events().len(), 3);
    assert_eq!(attribute.winning_event().and_then(|event| event.value()), Some(&json!("first")));
}

#[test]
fn explicit_null_or_false_beats_no_value() {
    let mut store = AttributeStore::default();
    store.find_or_define_attribute("empty", "p1", AttributeOptions::new()).unwrap();
    store.find_or_define_attribute("nil", "p1", contribution(1, Value::Null)).unwrap();
    store.find_or_define_attribute("off", "p1", contribution(1, json!(false))).unwrap();

    let empty = store.value_of("empty", "p1").unwrap();
    assert_eq!(empty.to_string(), "Attribute 'empty' does not have a value. Skipping test.");
    assert_eq!(store.value_of("nil", "p1").unwrap(), AttributeValue::Resolved(Value::Null));
    assert_eq!(store.value_of("off", "p1").unwrap(), AttributeValue::Resolved(json!(false)));
}

#[test]
fn repeated_definitions_merge_metadata_and_accumulate_events() {
    let mut store = AttributeStore::default();
    store
        .find_or_define_attribute("color", "p1", AttributeOptions::new().with_title("Colour").with_description("paint"))
        .unwrap();
    store
        .find_or_define_attribute("color", "p1", AttributeOptions::new().with_title("Color").with_value(json!("red")))
        .unwrap();
    store.find_or_define_attribute("size", "p1", AttributeOptions::new()).unwrap();

    let attribute = store.find_attribute("color", "p1").unwrap();
    assert_eq!(attribute.title(), Some("Color"));
    assert_eq!(attribute.description(), Some("paint"));
    assert_eq!(attribute.events().len(), 2);
    assert_eq!(store.list_attributes_for_profile("p1").len(), 2);
}

#[test]
fn alias_registered_before_definition() {
    let mut store = AttributeStore::default();
    store.register_profile_alias("new_profile", "old_profile");
    store
        .find_or_define_attribute("color", "new_profile", contribution(10, json!("blue")))
        .unwrap();
    assert_eq!(resolved(&store, "color", "new_profile"), json!("blue"));
    assert_eq!(resolved(&store, "color", "old_profile"), json!("blue"));
}

#[test]
fn alias_used_for_definition() {
    let mut store = AttributeStore::default();
    store.register_profile_alias("new_profile", "old_profile");
    store
        .find_or_define_attribute("color", "old_profile", contribution(10, json!("blue")))
        .unwrap();
    assert_eq!(resolved(&store, "color", "old_profile"), json!("blue"));
    assert_eq!(resolved(&store, "color", "new_profile"), json!("blue"));
    assert!(!store.profile_known("old_profile"));
}

#[test]
fn numeric_restriction_accepts_numeric_strings_only() {
    let mut store = AttributeStore::default();
    store
        .find_or_define_attribute("port", "p1", AttributeOptions::new().with_type("Numeric").with_value(json!("123")))
        .unwrap();

    let error = store
        .find_or_define_attribute("port", "p1", AttributeOptions::new().with_value(json!("abc")))
        .unwrap_err();
    match error {
        AttributeError::ValidationError {
            attribute_name,
            value,
            type_name,
        } => {
            assert_eq!(attribute_name, "port");
            assert_eq!(value, json!("abc"));
            assert_eq!(type_name, "Numeric");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.find_attribute("port", "p1").unwrap().events().len(), 1);
    assert_eq!(resolved(&store, "port", "p1"), json!("123"));
}

#[test]
fn missing_attribute_error_names_both() {
    let mut store = AttributeStore::default();
    store.find_or_define_attribute("color", "p1", AttributeOptions::new()).unwrap();
    let message = store.find_attribute("missing", "p1").unwrap_err().to_string();
    assert!(message.contains("p1"), "message: {}", message);
    assert!(message.contains("missing"), "message: {}", message);
}

#[test]
fn ingests_attribute_file_at_file_priority() {
    let mut store = AttributeStore::default();
    store
        .find_or_define_attribute("color", "linux-baseline", AttributeOptions::new().with_value(json!("silver")).with_priority(20))
        .unwrap();

    let options = IngestionOptions {
        attrs: vec![fixture("attrs.yml")],
    };
    store.register_external_attributes("linux-baseline", &options).unwrap();

    assert_eq!(resolved(&store, "color", "linux-baseline"), json!("gold"));
    assert_eq!(resolved(&store, "port", "linux-baseline"), json!(2222));
    assert_eq!(resolved(&store, "password_auth", "linux-baseline"), json!(false));
    assert_eq!(
        store.value_of("limits", "linux-baseline").unwrap().field("nofile").field("hard"),
        AttributeValue::Resolved(json!(4096))
    );
    assert_eq!(store.list_attributes_for_profile("linux-baseline").len(), 5);

    let winner = store.find_attribute("color", "linux-baseline").unwrap().winning_event().unwrap();
    assert_eq!(winner.provider(), "attr_file");
    assert_eq!(winner.priority(), 40);
    assert!(winner.file().is_some_and(|file| file.ends_with("attrs.yml")));
}

#[test]
fn earlier_file_wins_ties_and_setter_outranks_files() {
    let mut store = AttributeStore::default();
    let options = IngestionOptions {
        attrs: vec![fixture("attrs.yml"), fixture("override.json")],
    };
    store.register_external_attributes("p1", &options).unwrap();

    assert_eq!(resolved(&store, "color", "p1"), json!("gold"));
    assert_eq!(resolved(&store, "banner", "p1"), Value::Null);

    store.set_value("color", "p1", json!("platinum"), None).unwrap();
    assert_eq!(resolved(&store, "color", "p1"), json!("platinum"));
}

#[test]
fn non_mapping_file_is_skipped_without_failing_batch() {
    let mut store = AttributeStore::default();
    let options = IngestionOptions {
        attrs: vec![fixture("not_a_mapping.yml"), fixture("override.json")],
    };
    store.register_external_attributes("p1", &options).unwrap();
    let names: Vec<_> = store.list_attributes_for_profile("p1").keys().cloned().collect();
    assert_eq!(names, vec!["color".to_string(), "banner".to_string()]);
}

#[test]
fn missing_file_leaves_profile_unchanged() {
    let mut store = AttributeStore::default();
    store
        .find_or_define_attribute("color", "p1", AttributeOptions::new().with_value(json!("silver")))
        .unwrap();

    let options = IngestionOptions {
        attrs: vec![fixture("does_not_exist.yml")],
    };
    let error = store.register_external_attributes("p1", &options).unwrap_err();
    assert!(matches!(error, AttributeError::AttributesFileDoesNotExist { .. }), "got {error:?}");

    let attributes = store.list_attributes_for_profile("p1");
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes["color"].events().len(), 1);
}

#[test]
fn failing_file_keeps_earlier_files() {
    let mut store = AttributeStore::default();
    let options = IngestionOptions {
        attrs: vec![fixture("override.json"), fixture("does_not_exist.yml"), fixture("attrs.yml")],
    };
    assert!(store.register_external_attributes("p1", &options).is_err());
    assert_eq!(resolved(&store, "color", "p1"), json!("platinum"));
    assert!(store.find_attribute("port", "p1").is_err());
}

#[test]
fn api_attributes_are_stamped_by_runner_api() {
    let mut store = AttributeStore::default();
    let mut attributes = IndexMap::new();
    attributes.insert("color".to_string(), json!("teal"));
    attributes.insert("retries".to_string(), json!(3));
    store.register_api_attributes("p1", &attributes).unwrap();

    assert_eq!(resolved(&store, "retries", "p1"), json!(3));
    let event = store.find_attribute("color", "p1").unwrap().winning_event().unwrap();
    assert_eq!(event.provider(), "runner_api");
    assert_eq!(event.profile(), "p1");
    assert!(event.file().is_some_and(|file| file.ends_with("store_tests.rs")), "file: {:?}", event.file());
    assert!(store.providers().is_activated("runner_api"));
    assert!(!store.providers().is_activated("attr_file"));
}

#[derive(Debug)]
struct FixedProvider {
    value: Value,
    priority: u8,
}

impl ValueProvider for FixedProvider {
    fn fetch_value(&self, attribute_name: &str, _profile_name: &str, _options: &AttributeOptions) -> Option<Value> {
        (attribute_name == "color").then(|| self.value.clone())
    }

    fn annotate_attribute_options(&self, _attribute_name: &str, options: AttributeOptions) -> AttributeOptions {
        options.with_description("fetched from the fixed provider")
    }

    fn priority_for_attribute(&self, _attribute_name: &str, _profile_name: &str) -> u8 {
        self.priority
    }
}

#[test]
fn provider_values_compete_at_provider_priority() {
    let mut providers = ProviderRegistry::with_core_providers();
    providers.register("the_plugin", || {
        Box::new(FixedProvider {
            value: json!("the-value-from-the-plugin"),
            priority: 70,
        })
    });
    let mut store = AttributeStore::with_providers(EvaluationMode::Exec, providers);
    store
        .register_external_attributes(
            "p1",
            &IngestionOptions {
                attrs: vec![fixture("attrs.yml")],
            },
        )
        .unwrap();

    assert_eq!(store.fetch_from_providers("color", "p1").unwrap(), 1);
    assert_eq!(store.fetch_from_providers("port", "p1").unwrap(), 0);
    assert_eq!(resolved(&store, "color", "p1"), json!("the-value-from-the-plugin"));

    let attribute = store.find_attribute("color", "p1").unwrap();
    assert_eq!(attribute.description(), Some("fetched from the fixed provider"));
    assert_eq!(attribute.winning_event().unwrap().provider(), "the_plugin");

    store.set_value("color", "p1", json!("manual"), None).unwrap();
    assert_eq!(resolved(&store, "color", "p1"), json!("the-value-from-the-plugin"));
}

#[test]
fn required_attribute_satisfied_by_file_in_exec_mode() {
    let mut store = AttributeStore::new(EvaluationMode::Exec);
    store
        .find_or_define_attribute("port", "p1", AttributeOptions::new().with_required(true).with_type("num"))
        .unwrap();
    assert!(matches!(store.value_of("port", "p1"), Err(AttributeError::RequiredError { .. })));

    store
        .register_external_attributes(
            "p1",
            &IngestionOptions {
                attrs: vec![fixture("attrs.yml")],
            },
        )
        .unwrap();
    assert_eq!(resolved(&store, "port", "p1"), json!(2222));
}
