//! Integration tests for namespace parsing and name helpers
//!
//! Tests versioned namespaces, fully-qualified names, identifiers, and the
//! reserved property set.

use proptest::prelude::*;
use taxon_foundation::{
    ErrorKind, Namespace, Primitive, ROOT_NAMESPACE, fully_qualified_name, get_namespace,
    get_short_name, is_primitive_type, is_reserved_property, is_root_type, is_valid_identifier,
    parse_namespace,
};

// =============================================================================
// Namespace Parsing
// =============================================================================

#[test]
fn namespace_versioned() {
    let ns = parse_namespace("org.acme@1.2.3", true).unwrap();
    assert_eq!(ns.name, "org.acme");
    assert_eq!(ns.version.as_deref(), Some("1.2.3"));
    assert!(ns.is_versioned());
}

#[test]
fn namespace_unversioned() {
    let ns = parse_namespace("org.acme", true).unwrap();
    assert_eq!(ns.name, "org.acme");
    assert!(ns.version.is_none());
}

#[test]
fn namespace_double_separator_rejected() {
    let err = parse_namespace("org.acme@1.2.3@4", false).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidNamespace { .. }));
}

#[test]
fn namespace_empty_rejected() {
    assert!(parse_namespace("", false).is_err());
    assert!(parse_namespace("@1.0.0", false).is_err());
}

#[test]
fn namespace_bad_semver_only_checked_when_validating() {
    assert!(parse_namespace("org.acme@one", true).is_err());
    let ns = parse_namespace("org.acme@one", false).unwrap();
    assert_eq!(ns.version.as_deref(), Some("one"));
    assert!(ns.semver().is_err());
}

#[test]
fn namespace_semver() {
    let ns = Namespace::parse("org.acme@2.1.0-beta.1").unwrap();
    let version = ns.semver().unwrap().unwrap();
    assert_eq!(version.major, 2);
    assert_eq!(version.minor, 1);
    assert!(!version.pre.is_empty());
}

#[test]
fn namespace_from_str_and_display() {
    let ns: Namespace = "org.acme.hr@1.0.0".parse().unwrap();
    assert_eq!(ns.to_string(), "org.acme.hr@1.0.0");
    assert_eq!(ns.unversioned().to_string(), "org.acme.hr");
    assert_eq!(ns.qualify("Person"), "org.acme.hr@1.0.0.Person");
}

// =============================================================================
// Fully-Qualified Names
// =============================================================================

#[test]
fn fqn_split() {
    let fqn = "org.acme@1.0.0.Person";
    assert_eq!(get_namespace(fqn).unwrap(), "org.acme@1.0.0");
    assert_eq!(get_short_name(fqn).unwrap(), "Person");
}

#[test]
fn fqn_without_namespace() {
    assert_eq!(get_namespace("Person").unwrap(), "");
    assert_eq!(get_short_name("Person").unwrap(), "Person");
    assert_eq!(fully_qualified_name("", "Person"), "Person");
}

#[test]
fn fqn_empty_rejected() {
    assert!(matches!(
        get_namespace("").unwrap_err().kind,
        ErrorKind::InvalidArgument(_)
    ));
    assert!(get_short_name("").is_err());
}

#[test]
fn root_types() {
    assert!(is_root_type(&format!("{ROOT_NAMESPACE}.Asset")));
    assert!(!is_root_type("org.acme@1.0.0.Asset"));
}

// =============================================================================
// Identifiers and Primitives
// =============================================================================

#[test]
fn identifiers() {
    assert!(is_valid_identifier("name"));
    assert!(is_valid_identifier("_private"));
    assert!(is_valid_identifier("$class"));
    assert!(!is_valid_identifier("1st"));
    assert!(!is_valid_identifier("has-dash"));
    assert!(!is_valid_identifier(""));
}

#[test]
fn reserved_properties() {
    for name in ["$class", "$identifier", "$timestamp"] {
        assert!(is_reserved_property(name), "{name} should be reserved");
    }
    assert!(!is_reserved_property("name"));
}

#[test]
fn primitives() {
    for name in ["Boolean", "String", "DateTime", "Double", "Integer", "Long"] {
        assert!(is_primitive_type(name));
    }
    assert!(!is_primitive_type("Person"));
    assert!(!is_primitive_type("string"));
    assert!(Primitive::Long.is_numeric());
    assert!(!Primitive::DateTime.is_numeric());
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn parse_roundtrips_display(
        name in "[a-z][a-z0-9]{0,6}(\\.[a-z][a-z0-9]{0,6}){0,3}",
        major in 0u64..50,
        minor in 0u64..50,
        patch in 0u64..50,
    ) {
        let text = format!("{name}@{major}.{minor}.{patch}");
        let ns = Namespace::parse(&text).unwrap();
        prop_assert_eq!(ns.to_string(), text);
        prop_assert_eq!(ns.name, name);
    }

    #[test]
    fn fqn_split_inverts_join(
        ns in "[a-z]{1,6}(\\.[a-z]{1,6}){0,2}@1\\.0\\.0",
        short in "[A-Z][a-zA-Z]{0,8}",
    ) {
        let fqn = fully_qualified_name(&ns, &short);
        prop_assert_eq!(get_namespace(&fqn).unwrap(), ns.as_str());
        prop_assert_eq!(get_short_name(&fqn).unwrap(), short.as_str());
    }
}
