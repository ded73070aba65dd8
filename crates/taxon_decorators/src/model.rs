//! The bundled command-set model, used for structural validation.

use taxon_foundation::METAMODEL_NAMESPACE;
use taxon_model::Model;
use taxon_model::builder::{ClassBuilder, ModelBuilder, PropertyBuilder, enumeration};

use crate::command::DCS_NAMESPACE;

/// File name under which the command-set model is registered.
pub const DCS_FILE_NAME: &str = "@org.accordproject.decoratorcommands.cto";

/// The `org.accordproject.decoratorcommands@0.3.0` model.
#[must_use]
pub fn dcs_model() -> Model {
    ModelBuilder::new(DCS_NAMESPACE)
        .import_type(METAMODEL_NAMESPACE, "Decorator")
        .declaration(enumeration("CommandType", &["UPSERT", "APPEND"]))
        .declaration(enumeration("MapElement", &["KEY", "VALUE", "KEY_VALUE"]))
        .declaration(
            ClassBuilder::concept("CommandTarget")
                .property(PropertyBuilder::string("namespace").optional())
                .property(PropertyBuilder::string("declaration").optional())
                .property(PropertyBuilder::string("property").optional())
                .property(PropertyBuilder::string("properties").array().optional())
                .property(PropertyBuilder::string("type").optional())
                .property(PropertyBuilder::object("mapElement", "MapElement").optional())
                .build(),
        )
        .declaration(
            ClassBuilder::concept("Command")
                .property(PropertyBuilder::object("target", "CommandTarget"))
                .property(PropertyBuilder::object("decorator", "Decorator"))
                .property(PropertyBuilder::object("type", "CommandType"))
                .property(PropertyBuilder::string("decoratorNamespace").optional())
                .build(),
        )
        .declaration(
            ClassBuilder::concept("DecoratorCommandSet")
                .property(PropertyBuilder::string("name"))
                .property(PropertyBuilder::string("version"))
                .property(PropertyBuilder::object("commands", "Command").array())
                .build(),
        )
        .build()
}
