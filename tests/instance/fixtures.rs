//! A small shop model shared by the instance tests.

use taxon_model::builder::{
    ClassBuilder, ModelBuilder, PropertyBuilder, enumeration, map, map_key, map_value,
};
use taxon_model::{ModelManager, ModelManagerOptions, Models};

pub const NS: &str = "org.shop@1.0.0";

pub fn fqn(name: &str) -> String {
    format!("{NS}.{name}")
}

pub fn shop() -> ModelManager {
    let model = ModelBuilder::new(NS)
        .declaration(enumeration("Status", &["ACTIVE", "RETIRED"]))
        .declaration(map("Prices", map_key("String"), map_value("Double")))
        .declaration(
            ClassBuilder::concept("Address")
                .property(PropertyBuilder::string("city"))
                .property(PropertyBuilder::string("zip").regex("^[0-9]{5}$", "").optional())
                .build(),
        )
        .declaration(
            ClassBuilder::participant("Customer")
                .identified_by("email")
                .property(PropertyBuilder::string("email"))
                .property(PropertyBuilder::string("name"))
                .property(PropertyBuilder::object("status", "Status"))
                .property(PropertyBuilder::date_time("joined").optional())
                .property(PropertyBuilder::object("address", "Address").optional())
                .property(PropertyBuilder::string("tags").array().optional())
                .build(),
        )
        .declaration(
            ClassBuilder::asset("Order")
                .identified()
                .property(PropertyBuilder::relationship("customer", "Customer"))
                .property(PropertyBuilder::integer("quantity").range(Some(1), Some(100)))
                .property(PropertyBuilder::object("prices", "Prices").optional())
                .build(),
        )
        .declaration(
            ClassBuilder::transaction("Purchase")
                .property(PropertyBuilder::relationship("order", "Order"))
                .build(),
        )
        .declaration(
            ClassBuilder::concept("Shape")
                .abstract_()
                .property(PropertyBuilder::string("label"))
                .build(),
        )
        .declaration(
            ClassBuilder::concept("Circle")
                .extends("Shape")
                .property(PropertyBuilder::double("radius"))
                .build(),
        )
        .build();
    let options = ModelManagerOptions::default().with_require_identifiers(false);
    ModelManager::from_ast(Models::new(vec![model]), options).unwrap()
}
