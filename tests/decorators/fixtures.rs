//! A small HR model shared by the decorator tests.

use taxon_model::builder::{
    ClassBuilder, ModelBuilder, PropertyBuilder, enumeration, map, map_key, map_value,
};
use taxon_model::{ModelManager, ModelManagerOptions, Models};

pub const NS: &str = "org.acme.hr@1.0.0";

pub fn hr() -> ModelManager {
    let model = ModelBuilder::new(NS)
        .declaration(enumeration("Level", &["JUNIOR", "SENIOR"]))
        .declaration(map("Skills", map_key("String"), map_value("Integer")))
        .declaration(
            ClassBuilder::participant("Employee")
                .identified_by("email")
                .property(PropertyBuilder::string("email"))
                .property(PropertyBuilder::string("firstName"))
                .property(PropertyBuilder::string("lastName"))
                .property(PropertyBuilder::double("salary"))
                .property(PropertyBuilder::object("level", "Level"))
                .build(),
        )
        .declaration(
            ClassBuilder::concept("Address")
                .property(PropertyBuilder::string("city"))
                .build(),
        )
        .build();
    let options = ModelManagerOptions::default().with_require_identifiers(false);
    ModelManager::from_ast(Models::new(vec![model]), options).unwrap()
}

pub fn fqn(name: &str) -> String {
    format!("{NS}.{name}")
}
