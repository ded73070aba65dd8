//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use taxon_foundation::{Error, ErrorContext, ErrorKind, Missing};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_invalid_namespace() {
    let err = Error::invalid_namespace("a@b@c", "more than one @ separator");
    let msg = format!("{err}");
    assert!(msg.contains("a@b@c"));
    assert!(msg.contains("more than one"));
}

#[test]
fn error_type_not_found_namespace() {
    let err = Error::namespace_not_found("org.missing@1.0.0.Thing", "org.missing@1.0.0");
    match &err.kind {
        ErrorKind::TypeNotFound { type_name, missing } => {
            assert_eq!(type_name, "org.missing@1.0.0.Thing");
            assert_eq!(*missing, Missing::Namespace("org.missing@1.0.0".to_string()));
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn error_type_not_found_type() {
    let err = Error::type_not_found("org.acme@1.0.0.Thing", "org.acme@1.0.0");
    assert!(matches!(
        err.kind,
        ErrorKind::TypeNotFound {
            missing: Missing::Type(_),
            ..
        }
    ));
    assert!(format!("{err}").contains("org.acme@1.0.0.Thing"));
}

#[test]
fn error_illegal_model() {
    let err = Error::illegal_model("duplicate class Person");
    assert!(matches!(err.kind, ErrorKind::IllegalModel { .. }));
    assert!(format!("{err}").contains("duplicate class Person"));
}

#[test]
fn error_missing_dependency() {
    let err = Error::new(ErrorKind::MissingDependency {
        uri: "https://models.example.com/x.cto".to_string(),
        reason: "404".to_string(),
    });
    assert!(err.is_missing_dependency());
    assert!(!Error::io("disk full").is_missing_dependency());
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_frames_accumulate() {
    let err = Error::illegal_model("bad")
        .with_frame("org.acme@1.0.0.Person")
        .with_frame("name");
    let context = err.context.expect("frames create a context");
    assert_eq!(context.stack, vec!["org.acme@1.0.0.Person", "name"]);
}

#[test]
fn context_display() {
    let ctx = ErrorContext::new()
        .with_source("acme.cto")
        .with_position(3, 7)
        .with_frame("Person");
    let msg = format!("{ctx}");
    assert!(msg.contains("acme.cto:3:7"));
    assert!(msg.contains("in Person"));
}
