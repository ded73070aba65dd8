//! Integration tests for command-set version migration

use serde_json::json;
use taxon_decorators::{
    DCS_VERSION, DecorateOptions, DecoratorCommandSet, can_migrate, decorate_models,
};
use taxon_foundation::ErrorKind;

use crate::fixtures::{NS, fqn, hr};

fn set_at(version: &str) -> DecoratorCommandSet {
    let ns = format!("org.accordproject.decoratorcommands@{version}");
    DecoratorCommandSet::from_json(&json!({
        "$class": format!("{ns}.DecoratorCommandSet"),
        "name": "legacy",
        "version": "1.0.0",
        "commands": [{
            "$class": format!("{ns}.Command"),
            "type": "UPSERT",
            "target": {
                "$class": format!("{ns}.CommandTarget"),
                "namespace": NS,
                "declaration": "Employee"
            },
            "decorator": {
                "$class": "concerto.metamodel@1.0.0.Decorator",
                "name": "Legacy",
                "arguments": []
            }
        }]
    }))
    .unwrap()
}

#[test]
fn migration_gate() {
    assert!(can_migrate("0.2.0", "0.3.0").unwrap());
    assert!(!can_migrate("1.0.0", "0.3.0").unwrap());
    assert!(!can_migrate("0.3.0", "0.3.0").unwrap());
    assert!(!can_migrate("0.4.0", "0.3.0").unwrap());
    assert!(can_migrate("not-a-version", "0.3.0").is_err());
}

#[test]
fn older_minor_migrates() {
    let migrated = set_at("0.2.0").migrate_to(DCS_VERSION).unwrap();
    assert_eq!(migrated.dcs_version().unwrap(), DCS_VERSION);
    assert!(migrated.commands[0].target.class.contains(DCS_VERSION));
    assert_eq!(migrated.commands[0].decorator.name, "Legacy");
}

#[test]
fn major_mismatch_refused() {
    let err = set_at("1.0.0").migrate_to(DCS_VERSION).unwrap_err();
    match err.kind {
        ErrorKind::MigrationRefused { from, to } => {
            assert_eq!(from, "1.0.0");
            assert_eq!(to, DCS_VERSION);
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn unmigrated_set_applies_when_not_validated() {
    let decorated = decorate_models(&hr(), &set_at("0.2.0"), &DecorateOptions::default()).unwrap();
    let employee = decorated.get_type(&fqn("Employee")).unwrap();
    assert_eq!(employee.decorators()[0].name, "Legacy");
}

#[test]
fn unmigrated_set_fails_structural_validation() {
    let options = DecorateOptions::default().with_validate(true);
    let err = decorate_models(&hr(), &set_at("0.2.0"), &options).unwrap_err();
    assert!(!matches!(err.kind, ErrorKind::MigrationRefused { .. }));
}

#[test]
fn migrated_set_validates_and_applies() {
    let legacy = set_at("0.2.0");
    let options = DecorateOptions::default().with_migrate(true).with_validate(true);
    let decorated = decorate_models(&hr(), &legacy, &options).unwrap();
    let employee = decorated.get_type(&fqn("Employee")).unwrap();
    assert_eq!(employee.decorators()[0].name, "Legacy");
}

#[test]
fn incompatible_set_is_never_applied() {
    let options = DecorateOptions::default().with_migrate(true);
    assert!(decorate_models(&hr(), &set_at("1.0.0"), &options).is_err());
}
