//! Integration tests for the JSON serializer
//!
//! Tests output shape, relationships, date-times, maps, and serializer options.

use serde_json::json;
use taxon_foundation::ErrorKind;
use taxon_instance::{MapInstance, Relationship, Resource, Serializer, SerializerOptions, Value};

use crate::fixtures::{fqn, shop};

fn customer() -> serde_json::Value {
    json!({
        "$class": fqn("Customer"),
        "$identifier": "ada@example.com",
        "email": "ada@example.com",
        "name": "Ada",
        "status": "ACTIVE",
        "joined": "2024-03-01T12:00:00.000Z",
        "address": { "$class": fqn("Address"), "city": "London", "zip": "12345" },
        "tags": ["vip", "early"]
    })
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn customer_round_trip() {
    let manager = shop();
    let serializer = Serializer::new(&manager);
    let resource = serializer.from_json(&customer(), None).unwrap();

    assert_eq!(resource.identifier(), Some("ada@example.com"));
    let address = match resource.get("address") {
        Some(Value::Resource(address)) => address,
        other => panic!("unexpected address {other:?}"),
    };
    assert_eq!(address.get("city").and_then(Value::as_str), Some("London"));

    assert_eq!(serializer.to_json(&resource, None).unwrap(), customer());
}

#[test]
fn output_follows_declaration_order() {
    let manager = shop();
    let serializer = Serializer::new(&manager);
    let resource = serializer.from_json(&customer(), None).unwrap();
    let text = serializer.to_string(&resource, None).unwrap();
    let email = text.find("\"email\"").unwrap();
    let name = text.find("\"name\"").unwrap();
    let tags = text.find("\"tags\"").unwrap();
    assert!(text.starts_with("{\"$class\""));
    assert!(email < name && name < tags);
}

#[test]
fn relationships_are_uris() {
    let manager = shop();
    let serializer = Serializer::new(&manager);
    let order = Resource::new(fqn("Order"))
        .with_identifier("o-1")
        .with("customer", Relationship::new(fqn("Customer"), "ada@example.com"))
        .with("quantity", 3_i64);

    let json = serializer.to_json(&order, None).unwrap();
    assert_eq!(
        json["customer"],
        "resource:org.shop@1.0.0.Customer#ada%40example.com"
    );

    let back = serializer.from_json(&json, None).unwrap();
    match back.get("customer") {
        Some(Value::Relationship(rel)) => assert_eq!(rel.identifier(), "ada@example.com"),
        other => panic!("unexpected customer {other:?}"),
    }
}

#[test]
fn maps_round_trip() {
    let manager = shop();
    let serializer = Serializer::new(&manager);
    let order = Resource::new(fqn("Order"))
        .with_identifier("o-2")
        .with("customer", Relationship::new(fqn("Customer"), "bob"))
        .with("quantity", 1_i64)
        .with(
            "prices",
            MapInstance::new(fqn("Prices")).with("apple", 0.5).with("pear", 0.75),
        );

    let json = serializer.to_json(&order, None).unwrap();
    assert_eq!(
        json["prices"],
        json!({ "$class": fqn("Prices"), "apple": 0.5, "pear": 0.75 })
    );
    assert_eq!(serializer.from_json(&json, None).unwrap(), order);
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn utc_offset_applies_to_output() {
    let manager = shop();
    let serializer = Serializer::new(&manager);
    let resource = serializer.from_json(&customer(), None).unwrap();

    let options = SerializerOptions::default().with_utc_offset(60);
    let json = serializer.to_json(&resource, Some(&options)).unwrap();
    assert_eq!(json["joined"], "2024-03-01T13:00:00.000+01:00");
}

#[test]
fn strict_date_times_by_default() {
    let manager = shop();
    let serializer = Serializer::new(&manager);
    let mut json = customer();
    json["joined"] = json!("2024-03-01T12:00");

    let err = serializer.from_json(&json, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidDateTime { .. }));

    let lenient = SerializerOptions::default().with_strict_date_times(false);
    let resource = serializer.from_json(&json, Some(&lenient)).unwrap();
    assert!(matches!(resource.get("joined"), Some(Value::DateTime(_))));
}

#[test]
fn undeclared_keys_rejected() {
    let manager = shop();
    let mut json = customer();
    json["nickname"] = json!("A");
    let err = Serializer::new(&manager).from_json(&json, None).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::UndeclaredProperty { ref property, .. } if property == "nickname"
    ));
}

#[test]
fn validation_can_be_disabled() {
    let manager = shop();
    let serializer = Serializer::new(&manager);
    let json = json!({ "$class": fqn("Customer"), "$identifier": "x", "email": "x" });

    assert!(serializer.from_json(&json, None).is_err());
    let options = SerializerOptions::default().with_validate(false);
    let resource = serializer.from_json(&json, Some(&options)).unwrap();
    assert!(!resource.contains("name"));
}

#[test]
fn serializer_defaults_apply_when_no_options() {
    let manager = shop();
    let serializer =
        Serializer::with_defaults(&manager, SerializerOptions::default().with_validate(false));
    let json = json!({ "$class": fqn("Customer"), "$identifier": "x", "email": "x" });
    assert!(serializer.from_json(&json, None).is_ok());
}
