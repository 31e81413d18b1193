//! Integration test: register element template batches against the
//! bundled element template schema.
//!
//! Covers the schema-version gate, identity uniqueness, schema compliance
//! through the `jsonschema` backend, and the partition property: every
//! submitted descriptor ends up either accepted or rejected, never both.

use std::collections::HashSet;

use proptest::prelude::*;
use semver::Version;
use serde_json::{json, Value};
use tplgate_core::{
    RejectionKind, SchemaValidation, SchemaValidator, TemplateDescriptor, VersionSlot,
};
use tplgate_registry::TemplateRegistry;
use tplgate_schema::{JsonSchemaValidator, BUNDLED_SCHEMA};

const SCHEMA_URI_PREFIX: &str =
    "https://unpkg.com/@camunda/zeebe-element-templates-json-schema@";

fn schema_uri(version: &str) -> String {
    format!("{SCHEMA_URI_PREFIX}{version}/resources/schema.json")
}

fn template(id: &str, name: &str) -> Value {
    json!({
        "name": name,
        "id": id,
        "appliesTo": ["bpmn:ServiceTask"],
        "properties": [
            {
                "type": "Hidden",
                "value": "http",
                "binding": { "type": "zeebe:taskDefinition:type" }
            },
            {
                "label": "Method",
                "type": "Dropdown",
                "value": "get",
                "choices": [
                    { "name": "GET", "value": "get" },
                    { "name": "POST", "value": "post" }
                ],
                "binding": { "type": "zeebe:input", "name": "method" }
            }
        ]
    })
}

fn with_schema(mut value: Value, version: &str) -> Value {
    value["$schema"] = json!(schema_uri(version));
    value
}

fn descriptors(values: Vec<Value>) -> Vec<TemplateDescriptor> {
    values
        .into_iter()
        .map(|v| TemplateDescriptor::from_value(v).unwrap())
        .collect()
}

fn bundled() -> JsonSchemaValidator {
    JsonSchemaValidator::bundled().unwrap()
}

fn messages<V: SchemaValidator>(registry: &TemplateRegistry<V>) -> Vec<String> {
    registry.errors().iter().map(ToString::to_string).collect()
}

// ---------------------------------------------------------------------------
// Schema version
// ---------------------------------------------------------------------------

#[test]
fn test_accepts_same_schema_version() {
    let validator = bundled();
    let supported = validator.supported_version().to_string();
    let mut registry = TemplateRegistry::new(validator);

    registry.add_all(descriptors(vec![
        with_schema(template("foo", "Foo"), &supported),
        with_schema(template("bar", "Bar"), &supported),
    ]));

    assert!(registry.errors().is_empty(), "{:?}", messages(&registry));
    assert_eq!(registry.valid_templates().len(), 2);
}

#[test]
fn test_accepts_lower_schema_version() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![
        with_schema(template("foo", "Foo"), "0.1.0"),
        with_schema(template("bar", "Bar"), "0.8.99"),
    ]));

    assert!(registry.errors().is_empty(), "{:?}", messages(&registry));
    assert_eq!(registry.valid_templates().len(), 2);
}

#[test]
fn test_accepts_template_without_schema() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![template("foo", "Foo"), template("bar", "Bar")]));

    assert!(registry.errors().is_empty(), "{:?}", messages(&registry));
    assert_eq!(registry.valid_templates().len(), 2);
}

#[test]
fn test_rejects_higher_schema_version_with_details() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![
        with_schema(template("foo", "Foo"), "99.99.99"),
        with_schema(template("bar", "Bar"), "1.0.0"),
    ]));

    assert!(registry.valid_templates().is_empty());
    assert_eq!(registry.errors().len(), 2);
    assert_eq!(
        messages(&registry)[0],
        "template(id: <foo>, name: <Foo>): unsupported element template schema version \
         <99.99.99>. Your installation only supports up to version <0.9.0>. \
         Please update your installation"
    );
    assert!(registry
        .errors()
        .iter()
        .all(|e| e.kind == RejectionKind::SchemaVersionUnsupported));
}

#[test]
fn test_explicit_supported_version() {
    let schema: Value = serde_json::from_str(BUNDLED_SCHEMA).unwrap();
    let validator = JsonSchemaValidator::new(&schema, Version::new(1, 2, 0)).unwrap();
    let mut registry = TemplateRegistry::new(validator);

    registry.add_all(descriptors(vec![json!({
        "id": "foo",
        "$schema": "https://example.com/99.99.99/schema.json"
    })]));

    let message = &registry.errors()[0].message;
    assert!(message.contains("unsupported element template schema version <99.99.99>"));
    assert!(message.contains("supports up to version <1.2.0>"));
    assert!(registry.valid_templates().is_empty());
}

#[test]
fn test_mixed_schema_versions() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![
        with_schema(template("a", "A"), "0.9.0"),
        with_schema(template("b", "B"), "99.99.99"),
        template("c", "C"),
        with_schema(template("d", "D"), "1.0.0"),
        with_schema(template("e", "E"), "0.2.0"),
        with_schema(template("f", "F"), "0.10.0"),
    ]));

    assert_eq!(registry.errors().len(), 3);
    assert_eq!(registry.valid_templates().len(), 3);

    let accepted: Vec<&str> = registry.valid_templates().iter().map(|t| t.id()).collect();
    assert_eq!(accepted, vec!["a", "c", "e"]);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[test]
fn test_duplicate_unversioned_ids() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![template("foo", "Foo"), template("foo", "Foo 2")]));

    assert_eq!(registry.valid_templates().len(), 1);
    assert_eq!(
        messages(&registry),
        vec!["template(id: <foo>, name: <Foo 2>): template id <foo> already used"]
    );
}

#[test]
fn test_versioned_ids() {
    let mut v1 = template("foo", "Foo");
    v1["version"] = json!("1.0");
    let mut v1_again = template("foo", "Foo");
    v1_again["version"] = json!("1.0");
    let mut v2 = template("foo", "Foo");
    v2["version"] = json!("2.0");

    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![v1, v2, v1_again]));

    assert_eq!(registry.valid_templates().len(), 2);
    assert_eq!(registry.errors().len(), 1);
    assert_eq!(
        registry.errors()[0].message,
        "template id <foo> and version <1.0> already used"
    );
}

#[test]
fn test_numeric_versions_compare_by_value() {
    let mut integer = template("a", "A");
    integer["version"] = json!(1);
    let mut float = template("a", "A");
    float["version"] = json!(1.0);
    let mut text = template("b", "B");
    text["version"] = json!("1.0");
    let mut float_b = template("b", "B");
    float_b["version"] = json!(1.0);

    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![integer, float, text, float_b]));

    let accepted: Vec<(&str, String)> = registry
        .valid_templates()
        .iter()
        .map(|t| (t.id(), t.slot().to_string()))
        .collect();
    assert_eq!(
        accepted,
        vec![("a", "1".to_string()), ("b", "1.0".to_string()), ("b", "1".to_string())]
    );
    assert_eq!(
        messages(&registry),
        vec!["template(id: <a>, name: <A>): template id <a> and version <1> already used"]
    );
}

#[test]
fn test_duplicates_across_batches() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![template("foo", "Foo")]));
    registry.add_all(descriptors(vec![template("foo", "Foo")]));

    assert_eq!(registry.valid_templates().len(), 1);
    assert_eq!(registry.errors().len(), 1);
    assert!(registry.get("foo", &VersionSlot::Unversioned).is_some());
}

// ---------------------------------------------------------------------------
// Schema compliance
// ---------------------------------------------------------------------------

#[test]
fn test_accepts_simple_templates() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all_json(json!([template("foo", "Foo"), template("bar", "Bar")]));

    assert!(registry.errors().is_empty(), "{:?}", messages(&registry));
    assert_eq!(registry.valid_templates().len(), 2);
}

#[test]
fn test_two_structural_violations_yield_two_records() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![
        json!({
            "name": 42,
            "id": "broken",
            "appliesTo": "bpmn:Task",
            "properties": []
        }),
        template("fine", "Fine"),
    ]));

    assert_eq!(registry.errors().len(), 2);
    assert!(registry
        .errors()
        .iter()
        .all(|e| e.kind == RejectionKind::SchemaComplianceFailure));
    assert!(registry
        .errors()
        .iter()
        .all(|e| e.template.as_ref().map(|t| t.id.as_str()) == Some("broken")));

    let accepted: Vec<&str> = registry.valid_templates().iter().map(|t| t.id()).collect();
    assert_eq!(accepted, vec!["fine"]);
    assert_eq!(registry.errors_by_template_id()["broken"].len(), 2);
}

#[test]
fn test_inspection_is_idempotent() {
    let mut registry = TemplateRegistry::new(bundled());
    registry.add_all(descriptors(vec![
        template("foo", "Foo"),
        template("foo", "Foo"),
        with_schema(template("bar", "Bar"), "99.0.0"),
    ]));

    let errors_a = registry.errors().to_vec();
    let valid_a = registry.valid_templates().to_vec();
    let errors_b = registry.errors().to_vec();
    let valid_b = registry.valid_templates().to_vec();
    assert_eq!(errors_a, errors_b);
    assert_eq!(valid_a, valid_b);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Accepts every descriptor structurally, isolating checks 1 and 2.
struct AcceptAll;

impl SchemaValidator for AcceptAll {
    fn validate(&self, _descriptor: &TemplateDescriptor) -> SchemaValidation {
        SchemaValidation::valid()
    }

    fn supported_version(&self) -> Version {
        Version::new(1, 2, 0)
    }
}

fn arb_descriptor() -> impl Strategy<Value = Value> {
    (
        0usize..4,
        prop::option::of(0usize..3),
        prop::option::of((0u64..3, 0u64..4, 0u64..2)),
    )
        .prop_map(|(id, version, schema)| {
            let mut value = json!({ "id": format!("t{id}") });
            if let Some(v) = version {
                value["version"] = json!(format!("{v}.0"));
            }
            if let Some((major, minor, patch)) = schema {
                value["$schema"] = json!(format!("https://example.com/{major}.{minor}.{patch}/schema.json"));
            }
            value
        })
}

proptest! {
    /// Every descriptor resolves to exactly one outcome.
    #[test]
    fn every_descriptor_resolves_once(batch in prop::collection::vec(arb_descriptor(), 0..24)) {
        let submitted = batch.len();
        let mut registry = TemplateRegistry::new(AcceptAll);
        registry.add_all(descriptors(batch));

        prop_assert_eq!(registry.valid_templates().len() + registry.rejected_count(), submitted);
        // Checks 1 and 2 record exactly one error per rejection.
        prop_assert_eq!(registry.errors().len(), registry.rejected_count());
    }

    /// No two accepted descriptors share an identity.
    #[test]
    fn accepted_identities_are_unique(batch in prop::collection::vec(arb_descriptor(), 0..24)) {
        let mut registry = TemplateRegistry::new(AcceptAll);
        registry.add_all(descriptors(batch));

        let mut seen = HashSet::new();
        for t in registry.valid_templates() {
            prop_assert!(seen.insert((t.id().to_string(), t.slot())));
        }
    }

    /// The schema-version check fails exactly for versions above the supported one.
    #[test]
    fn schema_version_gate(major in 0u64..3, minor in 0u64..4, patch in 0u64..2, declares_schema in any::<bool>()) {
        let mut value = json!({ "id": "t" });
        if declares_schema {
            value["$schema"] = json!(format!("https://example.com/{major}.{minor}.{patch}/schema.json"));
        }
        let mut registry = TemplateRegistry::new(AcceptAll);
        registry.add(TemplateDescriptor::from_value(value).unwrap());

        let newer = Version::new(major, minor, patch) > Version::new(1, 2, 0);
        let expect_rejected = declares_schema && newer;
        prop_assert_eq!(registry.valid_templates().is_empty(), expect_rejected);
        if expect_rejected {
            prop_assert_eq!(registry.errors()[0].kind, RejectionKind::SchemaVersionUnsupported);
        }
    }
}
