//! Decorated registries remain fully usable for instances.

use serde_json::json;
use taxon_decorators::{
    Command, CommandTarget, DCS_VERSION, DecorateOptions, DecoratorCommandSet, decorate_models,
};
use taxon_instance::{Factory, FactoryOptions, GenerateMode, Serializer};
use taxon_model::ast::DecoratorArgument;
use taxon_model::builder::{ClassBuilder, ModelBuilder, PropertyBuilder};
use taxon_model::{Decorator, ModelManager, ModelManagerOptions, Models};

const NS: &str = "org.acme.catalog@1.0.0";

fn catalog() -> ModelManager {
    let model = ModelBuilder::new(NS)
        .declaration(
            ClassBuilder::asset("Product")
                .identified_by("sku")
                .property(PropertyBuilder::string("sku").regex("^[A-Z]{3}-[0-9]{3}$", ""))
                .property(PropertyBuilder::double("price").double_range(Some(0.0), None))
                .build(),
        )
        .build();
    ModelManager::from_ast(Models::new(vec![model]), ModelManagerOptions::default()).unwrap()
}

fn decorated() -> ModelManager {
    let set = DecoratorCommandSet::new("ui", DCS_VERSION)
        .with_command(Command::upsert(
            CommandTarget::new().namespace(NS).declaration("Product"),
            Decorator::new("Icon").with_argument(DecoratorArgument::string("box")),
        ))
        .with_command(Command::upsert(
            CommandTarget::new().declaration("Product").property("price"),
            Decorator::new("Currency").with_argument(DecoratorArgument::string("USD")),
        ));
    let options = DecorateOptions::default().with_validate_commands(true);
    decorate_models(&catalog(), &set, &options).unwrap()
}

#[test]
fn serializer_uses_decorated_registry() {
    crate::init_tracing();
    let manager = decorated();
    let serializer = Serializer::new(&manager);
    let json = json!({
        "$class": format!("{NS}.Product"),
        "sku": "ABC-123",
        "price": 9.5
    });
    let product = serializer.from_json(&json, None).unwrap();
    assert_eq!(product.identifier(), Some("ABC-123"));

    let bad = json!({ "$class": format!("{NS}.Product"), "sku": "abc", "price": 1.0 });
    assert!(serializer.from_json(&bad, None).is_err());
}

#[test]
fn factory_uses_decorated_registry() {
    let manager = decorated();
    let options = FactoryOptions::default().with_generate(GenerateMode::Empty);
    let product = Factory::new(&manager)
        .new_resource(&format!("{NS}.Product"), Some("XYZ-999"), &options)
        .unwrap();
    let json = Serializer::new(&manager).to_json(&product, None).unwrap();
    assert_eq!(json["price"], json!(0.0));
    assert_eq!(json["$identifier"], "XYZ-999");
}
