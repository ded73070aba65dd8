//! Extraction round trips.
//!
//! Decorators are split out of a registry into command sets and
//! vocabularies, written to YAML, read back, and re-applied to the stripped
//! registry. Every namespace must come back byte for byte.

use taxon_decorators::{
    DecorateOptions, DecoratorCommandSet, ExtractOptions, Vocabulary, decorate_models,
    extract_decorators,
};
use taxon_model::ast::{Declaration, DecoratorArgument, TypeIdentifier};
use taxon_model::builder::{
    ClassBuilder, ModelBuilder, PropertyBuilder, decorator, enumeration, map, map_key, map_value,
};
use taxon_model::{Decorator, ModelManager, ModelManagerOptions, Models};

const PEOPLE: &str = "org.acme.people@1.0.0";
const PAYROLL: &str = "org.acme.payroll@2.1.0";

fn people() -> taxon_model::Model {
    let mut status = enumeration("Status", &["ACTIVE", "LEFT"]);
    if let Declaration::Enum(e) = &mut status {
        e.properties[0].decorators.push(decorator("Term", &["Active"]));
        e.properties[1].decorators.push(decorator("Term", &["Has left"]));
        e.properties[1].decorators.push(decorator("Deprecated", &[]));
    }
    ModelBuilder::new(PEOPLE)
        .decorator(decorator("Owner", &["hr-team"]))
        .declaration(status)
        .declaration(
            ClassBuilder::participant("Person")
                .identified_by("email")
                .decorator(decorator("Term", &["A person"]))
                .decorator(decorator("Term_plural", &["People"]))
                .decorator(decorator("Table", &["people"]))
                .property(
                    PropertyBuilder::string("email")
                        .decorator(decorator("Term", &["Email address"]))
                        .decorator(decorator("Pattern", &["email"])),
                )
                .property(PropertyBuilder::string("name").decorator(decorator("Term", &["Full name"])))
                .property(PropertyBuilder::object("status", "Status"))
                .build(),
        )
        .build()
}

fn payroll() -> taxon_model::Model {
    let mut rates = map("Rates", map_key("String"), map_value("Double"));
    if let Declaration::Map(m) = &mut rates {
        m.key.element_mut().decorators.push(decorator("Term", &["Grade"]));
        m.value.element_mut().decorators.push(decorator("Term", &["Hourly rate"]));
        m.value
            .element_mut()
            .decorators
            .push(Decorator::new("Precision").with_argument(DecoratorArgument::Number { value: 2.0 }));
    }
    let link = Decorator::new("Link").with_argument(DecoratorArgument::TypeReference {
        type_ref: TypeIdentifier::qualified(PEOPLE, "Person"),
        is_array: false,
    });
    ModelBuilder::new(PAYROLL)
        .import_type(PEOPLE, "Person")
        .declaration(rates)
        .declaration(
            ClassBuilder::asset("Payslip")
                .identified()
                .decorator(decorator("Term", &["Payslip"]))
                .decorator(link)
                .property(PropertyBuilder::relationship("employee", "Person"))
                .property(
                    PropertyBuilder::double("gross")
                        .decorator(Decorator::new("Sensitive").with_argument(DecoratorArgument::Boolean { value: true })),
                )
                .property(PropertyBuilder::object("rates", "Rates").optional())
                .build(),
        )
        .build()
}

fn registry() -> ModelManager {
    ModelManager::from_ast(
        Models::new(vec![people(), payroll()]),
        ModelManagerOptions::default(),
    )
    .unwrap()
}

fn canonical(manager: &ModelManager) -> Vec<(String, String)> {
    manager
        .get_ast(true)
        .models
        .iter()
        .map(|m| (m.namespace.clone(), serde_json::to_string(m).unwrap()))
        .collect()
}

#[test]
fn extraction_splits_by_namespace() {
    let extraction = extract_decorators(&registry(), &ExtractOptions::default()).unwrap();
    assert_eq!(extraction.vocabularies.len(), 2);
    assert_eq!(extraction.command_sets.len(), 2);

    let people = extraction
        .vocabularies
        .iter()
        .find(|v| v.namespace == PEOPLE)
        .unwrap();
    assert_eq!(people.term("Person", Some("name")), Some("Full name"));
    assert_eq!(people.term("Status", Some("LEFT")), Some("Has left"));

    let payroll = extraction
        .command_sets
        .iter()
        .find(|s| s.name == PAYROLL)
        .unwrap();
    let names: Vec<&str> = payroll
        .commands
        .iter()
        .map(|c| c.decorator.name.as_str())
        .collect();
    assert_eq!(names, vec!["Precision", "Link", "Sensitive"]);
}

#[test]
fn round_trip_through_yaml_restores_every_namespace() {
    crate::init_tracing();
    let original = registry();
    let options = ExtractOptions::default()
        .with_remove_decorators(true)
        .with_locale("en-GB");
    let extraction = extract_decorators(&original, &options).unwrap();
    assert_ne!(canonical(&extraction.manager), canonical(&original));

    let vocabularies: Vec<Vocabulary> = extraction
        .vocabularies
        .iter()
        .map(|v| Vocabulary::from_yaml(&v.to_yaml().unwrap()).unwrap())
        .collect();
    assert_eq!(vocabularies, extraction.vocabularies);
    let command_sets: Vec<DecoratorCommandSet> = extraction
        .command_sets
        .iter()
        .map(|s| DecoratorCommandSet::from_yaml(&s.to_yaml().unwrap()).unwrap())
        .collect();

    let validate = DecorateOptions::default().with_validate_commands(true);
    let mut restored = extraction.manager;
    for vocabulary in &vocabularies {
        assert_eq!(vocabulary.locale, "en-GB");
        restored = decorate_models(&restored, &vocabulary.to_command_set(), &validate).unwrap();
    }
    for set in &command_sets {
        restored = decorate_models(&restored, set, &validate).unwrap();
    }
    assert_eq!(canonical(&restored), canonical(&original));
}

#[test]
fn stripped_registry_keeps_namespace_decorators() {
    let options = ExtractOptions::default().with_remove_decorators(true);
    let extraction = extract_decorators(&registry(), &options).unwrap();
    let ast = extraction.manager.get_ast(false);
    let people = ast.models.iter().find(|m| m.namespace == PEOPLE).unwrap();
    assert_eq!(people.decorators[0].name, "Owner");
    let person = extraction
        .manager
        .get_type(&format!("{PEOPLE}.Person"))
        .unwrap();
    assert!(person.decorators().is_empty());
}

#[test]
fn round_trip_keeps_terms_that_follow_other_decorators() {
    let mut tags = map("Tags", map_key("String"), map_value("String"));
    if let Declaration::Map(m) = &mut tags {
        m.key.element_mut().decorators.push(decorator("Trim", &[]));
        m.key.element_mut().decorators.push(decorator("Term", &["Tag"]));
    }
    let model = ModelBuilder::new("org.acme.misc@1.0.0")
        .declaration(tags)
        .declaration(
            ClassBuilder::participant("Member")
                .identified_by("handle")
                .decorator(decorator("Form", &["wide"]))
                .decorator(decorator("Term", &["A member"]))
                .decorator(decorator("Term_plural", &["Members"]))
                .property(
                    PropertyBuilder::string("handle")
                        .decorator(decorator("Term_short", &["Handle"]))
                        .decorator(decorator("Term", &["Member handle"])),
                )
                .build(),
        )
        .build();
    let original =
        ModelManager::from_ast(Models::new(vec![model]), ModelManagerOptions::default()).unwrap();
    let options = ExtractOptions::default().with_remove_decorators(true);
    let extraction = extract_decorators(&original, &options).unwrap();

    let mut restored = extraction.manager;
    for vocabulary in &extraction.vocabularies {
        let vocabulary = Vocabulary::from_yaml(&vocabulary.to_yaml().unwrap()).unwrap();
        restored = decorate_models(&restored, &vocabulary.to_command_set(), &DecorateOptions::default()).unwrap();
    }
    for set in &extraction.command_sets {
        let set = DecoratorCommandSet::from_yaml(&set.to_yaml().unwrap()).unwrap();
        restored = decorate_models(&restored, &set, &DecorateOptions::default()).unwrap();
    }
    assert_eq!(canonical(&restored), canonical(&original));
}
