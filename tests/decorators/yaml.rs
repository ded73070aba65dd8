//! Integration tests for the YAML form of command sets

use taxon_decorators::{
    Command, CommandTarget, DCS_VERSION, DecorateOptions, DecoratorCommandSet, MapElement,
    decorate_models, json_to_yaml, yaml_to_json,
};
use taxon_model::Decorator;
use taxon_model::ast::DecoratorArgument;

use crate::fixtures::{NS, fqn, hr};

fn set() -> DecoratorCommandSet {
    DecoratorCommandSet::new("ui", DCS_VERSION)
        .with_command(Command::upsert(
            CommandTarget::new().namespace(NS).declaration("Employee"),
            Decorator::new("Label").with_argument(DecoratorArgument::string("Staff member")),
        ))
        .with_command(Command::upsert(
            CommandTarget::new()
                .declaration("Employee")
                .property("salary"),
            Decorator::new("Currency")
                .with_argument(DecoratorArgument::string("EUR"))
                .with_argument(DecoratorArgument::Number { value: 2.0 }),
        ))
        .with_command(Command::append(
            CommandTarget::new()
                .declaration("Skills")
                .map_element(MapElement::Value),
            Decorator::new("Score"),
        ))
}

#[test]
fn yaml_is_compact() {
    let yaml = set().to_yaml().unwrap();
    assert!(!yaml.contains("$class"));
    assert!(yaml.contains("Label: Staff member"));
    assert!(yaml.contains("decorator: Score"));
    assert!(yaml.contains("action: APPEND"));
}

#[test]
fn yaml_round_trip() {
    let original = set();
    let restored = DecoratorCommandSet::from_yaml(&original.to_yaml().unwrap()).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn json_and_yaml_forms_agree() {
    let json = set().to_json().unwrap();
    let back = yaml_to_json(&json_to_yaml(&json).unwrap()).unwrap();
    assert_eq!(back, json);
}

#[test]
fn hand_written_yaml_decorates() {
    let text = format!(
        "\
decoratorCommandsVersion: {DCS_VERSION}
name: hand
version: 0.1.0
commands:
  - action: UPSERT
    target:
      namespace: {NS}
      declaration: Employee
      property: email
    decorator:
      Pattern: email
  - action: UPSERT
    target:
      declaration: Employee
    decorator: Audited
"
    );
    let set = DecoratorCommandSet::from_yaml(&text).unwrap();
    let decorated = decorate_models(&hr(), &set, &DecorateOptions::default().with_validate(true)).unwrap();
    let employee = decorated.get_type(&fqn("Employee")).unwrap();
    assert_eq!(employee.decorators()[0].name, "Audited");
    let email = employee.property("email").unwrap().unwrap();
    assert_eq!(email.field().decorators[0].name, "Pattern");
}

#[test]
fn malformed_yaml_rejected() {
    assert!(DecoratorCommandSet::from_yaml("commands: [").is_err());
    assert!(DecoratorCommandSet::from_yaml("name: x\nversion: 1.0.0\ncommands: []\n").is_err());
}
