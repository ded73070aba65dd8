//! Integration tests for field validators
//!
//! Tests numeric ranges, string patterns, and length bounds, both directly
//! and as declared on model properties.

use taxon_foundation::{Bound, ErrorKind};
use taxon_model::ast::{LengthValidator, RegexValidator};
use taxon_model::builder::{ClassBuilder, ModelBuilder, PropertyBuilder};
use taxon_model::{ModelManager, ModelManagerOptions, Models, Number, NumberValidator, StringValidator};

fn regex(pattern: &str) -> RegexValidator {
    RegexValidator {
        pattern: pattern.to_string(),
        flags: String::new(),
    }
}

// =============================================================================
// Number Validator
// =============================================================================

#[test]
fn number_bounds_are_inclusive() {
    let validator = NumberValidator::new(
        "score",
        Some(Number::Integer(0)),
        Some(Number::Integer(100)),
        None,
    )
    .unwrap();
    assert!(validator.validate("s1", Some(Number::Integer(0))).is_ok());
    assert!(validator.validate("s1", Some(Number::Integer(100))).is_ok());
    assert!(validator.validate("s1", None).is_ok());

    let err = validator.validate("s1", Some(Number::Integer(-1))).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::OutOfRange {
            bound: Bound::Lower,
            ..
        }
    ));
    let err = validator.validate("s1", Some(Number::Integer(101))).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::OutOfRange {
            bound: Bound::Upper,
            ..
        }
    ));
}

#[test]
fn number_validator_needs_a_bound() {
    assert!(NumberValidator::new("score", None, None, None).is_err());
}

#[test]
fn number_validator_rejects_inverted_bounds() {
    let err = NumberValidator::new(
        "ratio",
        Some(Number::Double(1.5)),
        Some(Number::Double(0.5)),
        None,
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IllegalModel { .. }));
}

#[test]
fn number_validator_open_bound() {
    let validator = NumberValidator::new("age", Some(Number::Integer(0)), None, None).unwrap();
    assert!(validator.validate("p", Some(Number::Integer(i64::MAX))).is_ok());
    assert!(validator.validate("p", Some(Number::Double(-0.5))).is_err());
}

// =============================================================================
// String Validator
// =============================================================================

#[test]
fn string_pattern() {
    let validator =
        StringValidator::new("code", Some(&regex("^[A-z][A-z][0-9]{7}")), None, None).unwrap();
    assert!(validator.validate("c", Some("AB1234567")).is_ok());

    let err = validator.validate("c", Some("xyz")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::PatternMismatch { .. }));
}

#[test]
fn string_invalid_pattern_is_a_model_error() {
    let err = StringValidator::new("code", Some(&regex("([a-z")), None, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IllegalModel { .. }));
}

#[test]
fn string_length() {
    let length = LengthValidator {
        min_length: Some(2),
        max_length: Some(4),
        ..LengthValidator::default()
    };
    let validator = StringValidator::new("tag", None, Some(&length), None).unwrap();
    assert!(validator.validate("t", Some("ab")).is_ok());
    assert!(validator.validate("t", Some("abcd")).is_ok());
    assert!(matches!(
        validator.validate("t", Some("a")).unwrap_err().kind,
        ErrorKind::LengthOutOfRange {
            bound: Bound::Lower,
            ..
        }
    ));
    assert!(validator.validate("t", Some("abcde")).is_err());
}

#[test]
fn string_default_must_satisfy_validator() {
    let err =
        StringValidator::new("code", Some(&regex("^[0-9]+$")), None, Some("abc")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IllegalModel { .. }));
}

// =============================================================================
// Declared Validators
// =============================================================================

#[test]
fn declared_validators_are_checked_at_load() {
    let model = ModelBuilder::new("org.acme@1.0.0")
        .declaration(
            ClassBuilder::concept("Reading")
                .property(PropertyBuilder::integer("level").range(Some(10), Some(1)))
                .build(),
        )
        .build();
    let options = ModelManagerOptions::default().with_require_identifiers(false);
    assert!(ModelManager::from_ast(Models::new(vec![model]), options).is_err());
}

#[test]
fn declared_validators_are_exposed() {
    let model = ModelBuilder::new("org.acme@1.0.0")
        .declaration(
            ClassBuilder::concept("Reading")
                .property(PropertyBuilder::integer("level").range(Some(0), Some(100)))
                .property(PropertyBuilder::string("code").regex("^[A-Z]+$", ""))
                .build(),
        )
        .build();
    let options = ModelManagerOptions::default().with_require_identifiers(false);
    let manager = ModelManager::from_ast(Models::new(vec![model]), options).unwrap();
    let reading = manager.get_type("org.acme@1.0.0.Reading").unwrap();

    let level = reading.property("level").unwrap().unwrap();
    let numbers = level.number_validator().unwrap().unwrap();
    assert!(numbers.validate("r", Some(Number::Integer(101))).is_err());

    let code = reading.property("code").unwrap().unwrap();
    let strings = code.string_validator().unwrap().unwrap();
    assert_eq!(strings.pattern(), Some("^[A-Z]+$"));
}
