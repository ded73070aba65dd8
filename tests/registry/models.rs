//! Integration tests for adding, updating, and removing models
//!
//! Tests atomic bulk loads, duplicate namespaces, and type lookups.

use taxon_foundation::{ErrorKind, Missing, ROOT_NAMESPACE};
use taxon_model::builder::{ClassBuilder, ModelBuilder, PropertyBuilder, enumeration};
use taxon_model::{Declaration, Model, ModelManager};

fn vehicles() -> Model {
    ModelBuilder::new("org.vehicles@1.0.0")
        .declaration(
            ClassBuilder::asset("Vehicle")
                .identified_by("vin")
                .property(PropertyBuilder::string("vin"))
                .property(PropertyBuilder::object("color", "Color"))
                .build(),
        )
        .declaration(enumeration("Color", &["RED", "GREEN"]))
        .build()
}

fn fleet() -> Model {
    ModelBuilder::new("org.fleet@1.0.0")
        .import_type("org.vehicles@1.0.0", "Vehicle")
        .declaration(
            ClassBuilder::asset("Truck")
                .extends("Vehicle")
                .property(PropertyBuilder::integer("axles"))
                .build(),
        )
        .build()
}

fn orphan() -> Model {
    ModelBuilder::new("org.orphan@1.0.0")
        .import_type("org.missing@1.0.0", "Thing")
        .declaration(
            ClassBuilder::concept("Holder")
                .identified()
                .property(PropertyBuilder::object("thing", "Thing"))
                .build(),
        )
        .build()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn load_in_any_order() {
    let mut manager = ModelManager::new();
    manager
        .add_models(vec![(fleet(), None), (vehicles(), None)])
        .unwrap();
    let truck = manager.get_type("org.fleet@1.0.0.Truck").unwrap();
    assert!(truck.is_assignable_to("org.vehicles@1.0.0.Vehicle").unwrap());
    assert_eq!(
        manager.get_namespaces(),
        vec![
            ROOT_NAMESPACE.to_string(),
            "org.fleet@1.0.0".to_string(),
            "org.vehicles@1.0.0".to_string(),
        ]
    );
}

#[test]
fn failed_bulk_load_rolls_back() {
    let mut manager = ModelManager::new();
    manager.add_model(vehicles(), Some("vehicles.cto")).unwrap();

    let err = manager
        .add_models(vec![(fleet(), None), (orphan(), None)])
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeNotFound {
            missing: Missing::Namespace(_),
            ..
        }
    ));
    assert!(manager.get_model_file("org.fleet@1.0.0").is_none());
    assert_eq!(manager.get_model_files(false).len(), 1);
}

#[test]
fn duplicate_namespace_names_both_files() {
    let mut manager = ModelManager::new();
    manager.add_model(vehicles(), Some("a.cto")).unwrap();
    let err = manager.add_model(vehicles(), Some("b.cto")).unwrap_err();
    match err.kind {
        ErrorKind::DuplicateNamespace {
            file,
            existing_file,
            ..
        } => {
            assert_eq!(file, "b.cto");
            assert_eq!(existing_file, "a.cto");
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn update_requires_loaded_namespace() {
    let mut manager = ModelManager::new();
    assert!(manager.update_model(vehicles(), None).is_err());
    manager.add_model(vehicles(), None).unwrap();
    assert!(manager.update_model(vehicles(), None).is_ok());
}

#[test]
fn delete_and_clear() {
    let mut manager = ModelManager::new();
    manager
        .add_models(vec![(vehicles(), None), (fleet(), None)])
        .unwrap();
    manager.delete_model("org.fleet@1.0.0").unwrap();
    assert!(manager.delete_model("org.fleet@1.0.0").is_err());
    assert!(manager.delete_model(ROOT_NAMESPACE).is_err());

    manager.clear_model_files();
    assert_eq!(manager.get_namespaces(), vec![ROOT_NAMESPACE.to_string()]);
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn type_lookup_distinguishes_failures() {
    let mut manager = ModelManager::new();
    manager.add_model(vehicles(), None).unwrap();

    let err = manager.get_type("org.nowhere@1.0.0.Vehicle").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeNotFound {
            missing: Missing::Namespace(_),
            ..
        }
    ));
    let err = manager.get_type("org.vehicles@1.0.0.Boat").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeNotFound {
            missing: Missing::Type(_),
            ..
        }
    ));
}

#[test]
fn declarations_by_kind() {
    let mut manager = ModelManager::new();
    manager
        .add_models(vec![(vehicles(), None), (fleet(), None)])
        .unwrap();
    assert_eq!(manager.get_class_declarations().len(), 2);
    assert_eq!(manager.get_enum_declarations().len(), 1);
    assert!(manager.get_map_declarations().is_empty());
}

#[test]
fn resolved_ast_qualifies_references() {
    let mut manager = ModelManager::new();
    manager
        .add_models(vec![(vehicles(), None), (fleet(), None)])
        .unwrap();
    let super_namespace = |resolve: bool| {
        let ast = manager.get_ast(resolve);
        let fleet = ast
            .models
            .iter()
            .find(|m| m.namespace == "org.fleet@1.0.0")
            .unwrap();
        match fleet.declaration("Truck") {
            Some(Declaration::Asset(truck)) => truck.super_type.as_ref().and_then(|t| t.namespace.clone()),
            other => panic!("unexpected declaration {other:?}"),
        }
    };
    assert_eq!(super_namespace(false), None);
    assert_eq!(super_namespace(true).as_deref(), Some("org.vehicles@1.0.0"));
}
