//! Integration tests for command-set validation
//!
//! Structural validation checks the shape of a set; command validation
//! checks its targets against a registry.

use serde_json::json;
use taxon_decorators::{
    Command, CommandTarget, DCS_VERSION, DecorateOptions, DecoratorCommandSet, decorate_models,
    validate, validate_command,
};
use taxon_foundation::ErrorKind;
use taxon_model::Decorator;

use crate::fixtures::{NS, hr};

fn command(target: CommandTarget) -> Command {
    Command::upsert(target, Decorator::new("Checked"))
}

fn assert_rejected(target: CommandTarget) {
    let registry = validate(&DecoratorCommandSet::new("x", DCS_VERSION), Some(&hr())).unwrap();
    let err = validate_command(&registry, &command(target)).unwrap_err();
    assert!(
        matches!(err.kind, ErrorKind::CommandValidation(_)),
        "unexpected error {err}"
    );
}

#[test]
fn well_formed_set_validates() {
    let set = DecoratorCommandSet::new("x", DCS_VERSION).with_command(command(
        CommandTarget::new().namespace(NS).declaration("Employee"),
    ));
    assert!(validate(&set, None).is_ok());
}

#[test]
fn unknown_command_type_fails_structurally() {
    let mut json = DecoratorCommandSet::new("x", DCS_VERSION)
        .with_command(command(CommandTarget::new()))
        .to_json()
        .unwrap();
    json["commands"][0]["type"] = json!("DELETE");
    let set = DecoratorCommandSet::from_json(&json).unwrap();
    assert!(validate(&set, None).is_err());

    let err = decorate_models(&hr(), &set, &DecorateOptions::default()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownCommandType(_)));
}

#[test]
fn valid_targets() {
    let registry = validate(&DecoratorCommandSet::new("x", DCS_VERSION), Some(&hr())).unwrap();
    for target in [
        CommandTarget::new(),
        CommandTarget::new().namespace(NS),
        CommandTarget::new().namespace("org.acme.hr").declaration("Employee"),
        CommandTarget::new()
            .namespace(NS)
            .declaration("Employee")
            .properties(["firstName", "lastName"]),
        CommandTarget::new().namespace(NS).declaration("Level").property("SENIOR"),
        CommandTarget::new().type_name("concerto.metamodel@1.0.0.StringProperty"),
    ] {
        validate_command(&registry, &command(target)).unwrap();
    }
}

#[test]
fn missing_namespace() {
    assert_rejected(CommandTarget::new().namespace("org.elsewhere@1.0.0"));
}

#[test]
fn missing_declaration() {
    assert_rejected(CommandTarget::new().namespace(NS).declaration("Manager"));
}

#[test]
fn missing_property() {
    assert_rejected(
        CommandTarget::new()
            .namespace(NS)
            .declaration("Employee")
            .property("middleName"),
    );
}

#[test]
fn unresolvable_type() {
    assert_rejected(CommandTarget::new().type_name("concerto.metamodel@1.0.0.NoSuchProperty"));
}

#[test]
fn property_and_properties_together() {
    assert_rejected(
        CommandTarget::new()
            .namespace(NS)
            .declaration("Employee")
            .property("email")
            .properties(["firstName"]),
    );
}

#[test]
fn decorate_with_command_validation() {
    let set = DecoratorCommandSet::new("x", DCS_VERSION).with_command(command(
        CommandTarget::new().namespace(NS).declaration("Ghost"),
    ));
    assert!(decorate_models(&hr(), &set, &DecorateOptions::default()).is_ok());
    let options = DecorateOptions::default().with_validate_commands(true);
    assert!(decorate_models(&hr(), &set, &options).is_err());
}
