//! Integration tests for wildcard target matching

use taxon_decorators::{Filter, falsy_or_equal};

fn list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn absent_filter_matches_anything() {
    assert!(falsy_or_equal(None, &["x"]));
    assert!(falsy_or_equal(None, &[]));
}

#[test]
fn scalar_filter_needs_membership() {
    assert!(!falsy_or_equal(Some(Filter::Value("x")), &["y"]));
    assert!(falsy_or_equal(Some(Filter::Value("x")), &["y", "x"]));
}

#[test]
fn list_filter_needs_intersection() {
    let filter = list(&["x", "z"]);
    assert!(falsy_or_equal(Some(Filter::List(&filter)), &["x", "y"]));
    assert!(!falsy_or_equal(Some(Filter::List(&filter)), &["y"]));
}

#[test]
fn filter_constructors() {
    let value = "Person".to_string();
    assert_eq!(Filter::value(Some(&value)), Some(Filter::Value("Person")));
    assert_eq!(Filter::value(None), None);
    let values = list(&["a"]);
    assert!(matches!(Filter::list(Some(&values)), Some(Filter::List(_))));
}
