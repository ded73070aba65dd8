//! Integration tests for identifier rules
//!
//! Identifier violations are reported when models are loaded, never later.

use taxon_foundation::ErrorKind;
use taxon_model::builder::{ClassBuilder, ModelBuilder, PropertyBuilder};
use taxon_model::{Model, ModelManager, ModelManagerOptions, Models};

const NS: &str = "org.acme@1.0.0";

fn load(model: Model, options: ModelManagerOptions) -> taxon_foundation::Result<ModelManager> {
    ModelManager::from_ast(Models::new(vec![model]), options)
}

#[test]
fn concrete_concept_without_identifier_fails() {
    let model = ModelBuilder::new(NS)
        .declaration(
            ClassBuilder::concept("Address")
                .property(PropertyBuilder::string("city"))
                .build(),
        )
        .build();
    let err = load(model, ModelManagerOptions::default()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ClassMustHaveIdentifier { .. }));
}

#[test]
fn abstract_concept_without_identifier_loads() {
    let model = ModelBuilder::new(NS)
        .declaration(
            ClassBuilder::concept("Shape")
                .abstract_()
                .property(PropertyBuilder::string("label"))
                .build(),
        )
        .build();
    assert!(load(model, ModelManagerOptions::default()).is_ok());
}

#[test]
fn identifiers_optional_when_not_required() {
    let model = ModelBuilder::new(NS)
        .declaration(
            ClassBuilder::concept("Address")
                .property(PropertyBuilder::string("city"))
                .build(),
        )
        .build();
    let options = ModelManagerOptions::default().with_require_identifiers(false);
    assert!(load(model, options).is_ok());
}

#[test]
fn redeclared_identifier_fails_at_load() {
    let model = ModelBuilder::new(NS)
        .declaration(
            ClassBuilder::asset("Vehicle")
                .identified_by("vin")
                .property(PropertyBuilder::string("vin"))
                .build(),
        )
        .declaration(
            ClassBuilder::asset("Car")
                .extends("Vehicle")
                .identified_by("plate")
                .property(PropertyBuilder::string("plate"))
                .build(),
        )
        .build();
    let err = load(model, ModelManagerOptions::default()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IllegalModel { .. }));
    assert!(err.to_string().contains("redeclare"));
}

#[test]
fn identifier_must_be_required_string() {
    let model = ModelBuilder::new(NS)
        .declaration(
            ClassBuilder::asset("Ticket")
                .identified_by("number")
                .property(PropertyBuilder::integer("number"))
                .build(),
        )
        .build();
    assert!(load(model, ModelManagerOptions::default()).is_err());
}

#[test]
fn inherited_identifier_satisfies_subclass() {
    let model = ModelBuilder::new(NS)
        .declaration(
            ClassBuilder::asset("Vehicle")
                .abstract_()
                .identified_by("vin")
                .property(PropertyBuilder::string("vin"))
                .build(),
        )
        .declaration(
            ClassBuilder::asset("Car")
                .extends("Vehicle")
                .property(PropertyBuilder::string("plate"))
                .build(),
        )
        .build();
    let manager = load(model, ModelManagerOptions::default()).unwrap();
    let car = manager.get_type(&format!("{NS}.Car")).unwrap();
    assert_eq!(car.identifier_field_name().unwrap().as_deref(), Some("vin"));
}

#[test]
fn redeclared_identifier_fails_when_added_alone() {
    let base = ModelBuilder::new("org.base@1.0.0")
        .declaration(
            ClassBuilder::asset("Vehicle")
                .identified_by("vin")
                .property(PropertyBuilder::string("vin"))
                .build(),
        )
        .build();
    let sub = ModelBuilder::new("org.sub@1.0.0")
        .import_type("org.base@1.0.0", "Vehicle")
        .declaration(
            ClassBuilder::asset("Car")
                .extends("Vehicle")
                .identified_by("plate")
                .property(PropertyBuilder::string("plate"))
                .build(),
        )
        .build();

    let mut manager = ModelManager::new();
    manager.add_model(base, None).unwrap();
    let err = manager.add_model(sub, None).unwrap_err();
    assert!(err.to_string().contains("redeclare"));
    assert!(manager.get_model_file("org.sub@1.0.0").is_none());
}

#[test]
fn missing_identifier_fails_when_added_alone() {
    let model = ModelBuilder::new(NS)
        .declaration(ClassBuilder::concept("Address").property(PropertyBuilder::string("city")).build())
        .build();
    let mut manager = ModelManager::new();
    let err = manager.add_model(model, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ClassMustHaveIdentifier { .. }));
    assert!(manager.get_model_files(false).is_empty());
}

#[test]
fn checks_wait_for_unloaded_imports() {
    let sub = ModelBuilder::new("org.sub@1.0.0")
        .import_type("org.base@1.0.0", "Vehicle")
        .declaration(ClassBuilder::asset("Car").extends("Vehicle").build())
        .build();
    let mut manager = ModelManager::new();
    assert!(manager.add_model(sub, None).is_ok());
    assert!(manager.validate_all().is_err());
}
