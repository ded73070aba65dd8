//! Integration tests for the resource factory
//!
//! Tests defaults, generated values, timestamps, and identifier rules.

use taxon_foundation::ErrorKind;
use taxon_instance::{
    Factory, FactoryOptions, GenerateMode, Serializer, SerializerOptions, Value, validate_resource,
};

use crate::fixtures::{fqn, shop};

#[test]
fn empty_mode_builds_valid_resources() {
    let manager = shop();
    let options = FactoryOptions::default().with_generate(GenerateMode::Empty);
    let customer = Factory::new(&manager)
        .new_resource(&fqn("Customer"), Some("ada"), &options)
        .unwrap();

    assert_eq!(customer.identifier(), Some("ada"));
    assert_eq!(customer.get("email").and_then(Value::as_str), Some("ada"));
    assert_eq!(customer.get("name").and_then(Value::as_str), Some(""));
    assert_eq!(customer.get("status").and_then(Value::as_str), Some("ACTIVE"));
    assert!(!customer.contains("address"));
    assert!(validate_resource(&manager, &customer).is_ok());
}

#[test]
fn empty_mode_respects_lower_bounds() {
    let manager = shop();
    let options = FactoryOptions::default().with_generate(GenerateMode::Empty);
    let order = Factory::new(&manager)
        .new_resource(&fqn("Order"), Some("o-1"), &options)
        .unwrap();
    assert_eq!(order.get("quantity"), Some(&Value::Integer(1)));
}

#[test]
fn optional_fields_on_request() {
    let manager = shop();
    let options = FactoryOptions::default()
        .with_generate(GenerateMode::Empty)
        .with_optional_fields(true);
    let customer = Factory::new(&manager)
        .new_resource(&fqn("Customer"), Some("ada"), &options)
        .unwrap();
    assert!(matches!(customer.get("address"), Some(Value::Resource(_))));
    assert_eq!(customer.get("tags"), Some(&Value::Array(Vec::new())));
}

#[test]
fn sample_mode_is_deterministic_per_seed() {
    let manager = shop();
    let factory = Factory::new(&manager);
    let options = FactoryOptions::default()
        .with_generate(GenerateMode::Sample)
        .with_seed(42);
    let first = factory.new_resource(&fqn("Order"), Some("o-1"), &options).unwrap();
    let second = factory.new_resource(&fqn("Order"), Some("o-1"), &options).unwrap();
    assert_eq!(first, second);

    let Some(Value::Integer(quantity)) = first.get("quantity") else {
        panic!("quantity not generated");
    };
    assert!((1..=100).contains(quantity));
}

#[test]
fn no_generation_leaves_fields_unset() {
    let manager = shop();
    let customer = Factory::new(&manager)
        .new_resource(&fqn("Customer"), Some("ada"), &FactoryOptions::default())
        .unwrap();
    assert!(!customer.contains("name"));
}

#[test]
fn transactions_are_timestamped() {
    let manager = shop();
    let purchase = Factory::new(&manager)
        .new_transaction(&fqn("Purchase"), None, &FactoryOptions::default())
        .unwrap();
    assert!(purchase.timestamp().is_some());

    let options = SerializerOptions::default().with_validate(false);
    let json = Serializer::new(&manager)
        .to_json(&purchase, Some(&options))
        .unwrap();
    assert!(json.get("$timestamp").is_some());
}

#[test]
fn transaction_constructor_checks_kind() {
    let manager = shop();
    let err = Factory::new(&manager)
        .new_transaction(&fqn("Order"), Some("o-1"), &FactoryOptions::default())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn identifier_rules() {
    let manager = shop();
    let factory = Factory::new(&manager);
    let options = FactoryOptions::default();

    let err = factory.new_resource(&fqn("Customer"), None, &options).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingIdentifier { .. }));
    let err = factory
        .new_resource(&fqn("Customer"), Some("  "), &options)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingIdentifier { .. }));
    let err = factory
        .new_resource(&fqn("Address"), Some("a-1"), &options)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotIdentifiable { .. }));
    let err = factory.new_concept(&fqn("Shape"), &options).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AbstractInstantiation { .. }));
}

#[test]
fn relationships() {
    let manager = shop();
    let factory = Factory::new(&manager);
    let rel = factory.new_relationship(&fqn("Customer"), "ada").unwrap();
    assert_eq!(rel.to_uri(), "resource:org.shop@1.0.0.Customer#ada");
    assert!(factory.new_relationship(&fqn("Circle"), "c").is_err());
}
