//! Integration tests for instance validation
//!
//! Validation is fail-fast: each test checks the first violation reported.

use taxon_foundation::{Bound, ErrorKind};
use taxon_instance::{InstanceValidator, Relationship, Resource, Value, validate_resource};

use crate::fixtures::{fqn, shop};

fn customer() -> Resource {
    Resource::new(fqn("Customer"))
        .with_identifier("ada")
        .with("email", "ada")
        .with("name", "Ada")
        .with("status", "ACTIVE")
}

fn order(quantity: i64) -> Resource {
    Resource::new(fqn("Order"))
        .with_identifier("o-1")
        .with("customer", Relationship::new(fqn("Customer"), "ada"))
        .with("quantity", quantity)
}

#[test]
fn valid_resources() {
    let manager = shop();
    assert!(validate_resource(&manager, &customer()).is_ok());
    assert!(validate_resource(&manager, &order(1)).is_ok());
    assert!(validate_resource(&manager, &order(100)).is_ok());
}

#[test]
fn range_violations() {
    let manager = shop();
    let err = validate_resource(&manager, &order(0)).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::OutOfRange {
            bound: Bound::Lower,
            ..
        }
    ));
    let err = validate_resource(&manager, &order(101)).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::OutOfRange {
            bound: Bound::Upper,
            ..
        }
    ));
}

#[test]
fn nested_pattern_violation() {
    let manager = shop();
    let address = Resource::new(fqn("Address"))
        .with("city", "Paris")
        .with("zip", "75-001");
    let resource = customer().with("address", address);
    let err = validate_resource(&manager, &resource).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::PatternMismatch { .. }));
}

#[test]
fn enum_membership() {
    let manager = shop();
    let resource = customer().with("status", "DELETED");
    let err = validate_resource(&manager, &resource).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::InvalidEnumValue { ref value, .. } if value == "DELETED"
    ));
}

#[test]
fn array_items_are_checked() {
    let manager = shop();
    let resource = customer().with(
        "tags",
        Value::Array(vec![Value::from("ok"), Value::from(3_i64)]),
    );
    let err = validate_resource(&manager, &resource).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn empty_identifier_rejected() {
    let manager = shop();
    let resource = customer().with("email", "");
    let err = validate_resource(&manager, &resource).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::EmptyIdentifier { .. }));
}

#[test]
fn abstract_class_rejected() {
    let manager = shop();
    let shape = Resource::new(fqn("Shape")).with("label", "blob");
    let err = validate_resource(&manager, &shape).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AbstractInstantiation { .. }));
}

#[test]
fn subtype_accepted_for_super_type() {
    let manager = shop();
    let circle = Resource::new(fqn("Circle"))
        .with("label", "c")
        .with("radius", 2.0);
    let validator = InstanceValidator::new(&manager);
    assert!(validator.validate_as(&circle, &fqn("Shape")).is_ok());
    let err = validator.validate_as(&circle, &fqn("Address")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn nested_resource_in_relationship_needs_permission() {
    let manager = shop();
    let resource = order(5).with("customer", customer());
    assert!(validate_resource(&manager, &resource).is_err());
    let validator = InstanceValidator::new(&manager).permit_resources_for_relationships(true);
    assert!(validator.validate(&resource).is_ok());
}
