//! Bundled system models.
//!
//! The root model declares the abstract base of every class kind and is
//! implicitly imported by every model file. The metamodel describes the
//! shape of model ASTs themselves; validation registries load it so that
//! AST fragments (such as decorators) can be validated as instances.

use taxon_foundation::{METAMODEL_NAMESPACE, ROOT_NAMESPACE};

use crate::ast::{Literal, Model};
use crate::builder::{ClassBuilder, ModelBuilder, PropertyBuilder};

/// File name under which the root model is registered.
pub const ROOT_FILE_NAME: &str = "@concerto.cto";

/// File name under which the metamodel is registered.
pub const METAMODEL_FILE_NAME: &str = "@concerto.metamodel.cto";

/// The root model `concerto@1.0.0`.
#[must_use]
pub fn root_model() -> Model {
    ModelBuilder::new(ROOT_NAMESPACE)
        .declaration(ClassBuilder::concept("Concept").abstract_().build())
        .declaration(ClassBuilder::asset("Asset").abstract_().identified().build())
        .declaration(
            ClassBuilder::participant("Participant")
                .abstract_()
                .identified()
                .build(),
        )
        .declaration(ClassBuilder::transaction("Transaction").abstract_().build())
        .declaration(ClassBuilder::event("Event").abstract_().build())
        .build()
}

fn located(builder: ClassBuilder) -> ClassBuilder {
    builder.property(PropertyBuilder::object("location", "Range").optional())
}

fn decorated(builder: ClassBuilder) -> ClassBuilder {
    located(builder.property(PropertyBuilder::object("decorators", "Decorator").array().optional()))
}

fn with_flag(name: &str) -> PropertyBuilder {
    PropertyBuilder::boolean(name).default_value(Literal::Boolean(false))
}

/// The subset of `concerto.metamodel@1.0.0` describing model ASTs.
///
/// Declarations are concepts without identifiers, so registries holding the
/// metamodel must not require identifiers.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn metamodel() -> Model {
    let concept = |name: &str| ClassBuilder::concept(name.to_string());
    let property = |name: &str| {
        decorated(
            concept(name)
                .abstract_()
                .property(PropertyBuilder::string("name"))
                .property(with_flag("isArray"))
                .property(with_flag("isOptional")),
        )
    };
    let scalar = |name: &str, default: PropertyBuilder| {
        concept(name)
            .extends("ScalarDeclaration")
            .property(default.optional())
    };

    ModelBuilder::new(METAMODEL_NAMESPACE)
        // Locations
        .declaration(
            concept("Position")
                .property(PropertyBuilder::integer("line"))
                .property(PropertyBuilder::integer("column"))
                .property(PropertyBuilder::integer("offset"))
                .build(),
        )
        .declaration(
            concept("Range")
                .property(PropertyBuilder::object("start", "Position"))
                .property(PropertyBuilder::object("end", "Position"))
                .property(PropertyBuilder::string("source").optional())
                .build(),
        )
        .declaration(
            concept("TypeIdentifier")
                .property(PropertyBuilder::string("name"))
                .property(PropertyBuilder::string("namespace").optional())
                .build(),
        )
        // Decorators
        .declaration(located(concept("DecoratorLiteral").abstract_()).build())
        .declaration(
            concept("DecoratorString")
                .extends("DecoratorLiteral")
                .property(PropertyBuilder::string("value"))
                .build(),
        )
        .declaration(
            concept("DecoratorNumber")
                .extends("DecoratorLiteral")
                .property(PropertyBuilder::double("value"))
                .build(),
        )
        .declaration(
            concept("DecoratorBoolean")
                .extends("DecoratorLiteral")
                .property(PropertyBuilder::boolean("value"))
                .build(),
        )
        .declaration(
            concept("DecoratorTypeReference")
                .extends("DecoratorLiteral")
                .property(PropertyBuilder::object("type", "TypeIdentifier"))
                .property(with_flag("isArray"))
                .build(),
        )
        .declaration(
            located(
                concept("Decorator")
                    .property(PropertyBuilder::string("name"))
                    .property(
                        PropertyBuilder::object("arguments", "DecoratorLiteral")
                            .array()
                            .optional(),
                    ),
            )
            .build(),
        )
        // Identifiers
        .declaration(concept("Identified").build())
        .declaration(
            concept("IdentifiedBy")
                .extends("Identified")
                .property(PropertyBuilder::string("name"))
                .build(),
        )
        // Validators
        .declaration(
            concept("StringRegexValidator")
                .property(PropertyBuilder::string("pattern"))
                .property(PropertyBuilder::string("flags"))
                .build(),
        )
        .declaration(
            concept("StringLengthValidator")
                .property(PropertyBuilder::integer("minLength").optional())
                .property(PropertyBuilder::integer("maxLength").optional())
                .build(),
        )
        .declaration(
            concept("IntegerDomainValidator")
                .property(PropertyBuilder::integer("lower").optional())
                .property(PropertyBuilder::integer("upper").optional())
                .build(),
        )
        .declaration(
            concept("LongDomainValidator")
                .property(PropertyBuilder::long("lower").optional())
                .property(PropertyBuilder::long("upper").optional())
                .build(),
        )
        .declaration(
            concept("DoubleDomainValidator")
                .property(PropertyBuilder::double("lower").optional())
                .property(PropertyBuilder::double("upper").optional())
                .build(),
        )
        // Properties
        .declaration(property("Property").build())
        .declaration(
            concept("StringProperty")
                .extends("Property")
                .property(PropertyBuilder::string("defaultValue").optional())
                .property(PropertyBuilder::object("validator", "StringRegexValidator").optional())
                .property(
                    PropertyBuilder::object("lengthValidator", "StringLengthValidator").optional(),
                )
                .build(),
        )
        .declaration(
            concept("BooleanProperty")
                .extends("Property")
                .property(PropertyBuilder::boolean("defaultValue").optional())
                .build(),
        )
        .declaration(
            concept("DateTimeProperty")
                .extends("Property")
                .property(PropertyBuilder::string("defaultValue").optional())
                .build(),
        )
        .declaration(
            concept("IntegerProperty")
                .extends("Property")
                .property(PropertyBuilder::integer("defaultValue").optional())
                .property(PropertyBuilder::object("validator", "IntegerDomainValidator").optional())
                .build(),
        )
        .declaration(
            concept("LongProperty")
                .extends("Property")
                .property(PropertyBuilder::long("defaultValue").optional())
                .property(PropertyBuilder::object("validator", "LongDomainValidator").optional())
                .build(),
        )
        .declaration(
            concept("DoubleProperty")
                .extends("Property")
                .property(PropertyBuilder::double("defaultValue").optional())
                .property(PropertyBuilder::object("validator", "DoubleDomainValidator").optional())
                .build(),
        )
        .declaration(
            concept("ObjectProperty")
                .extends("Property")
                .property(PropertyBuilder::object("type", "TypeIdentifier"))
                .property(PropertyBuilder::string("defaultValue").optional())
                .build(),
        )
        .declaration(
            concept("RelationshipProperty")
                .extends("Property")
                .property(PropertyBuilder::object("type", "TypeIdentifier"))
                .build(),
        )
        .declaration(
            decorated(concept("EnumProperty").property(PropertyBuilder::string("name"))).build(),
        )
        // Declarations
        .declaration(
            decorated(
                concept("Declaration")
                    .abstract_()
                    .property(PropertyBuilder::string("name")),
            )
            .build(),
        )
        .declaration(
            concept("ConceptDeclaration")
                .extends("Declaration")
                .property(with_flag("isAbstract"))
                .property(PropertyBuilder::object("identified", "Identified").optional())
                .property(PropertyBuilder::object("superType", "TypeIdentifier").optional())
                .property(PropertyBuilder::object("properties", "Property").array())
                .build(),
        )
        .declaration(concept("AssetDeclaration").extends("ConceptDeclaration").build())
        .declaration(concept("ParticipantDeclaration").extends("ConceptDeclaration").build())
        .declaration(concept("TransactionDeclaration").extends("ConceptDeclaration").build())
        .declaration(concept("EventDeclaration").extends("ConceptDeclaration").build())
        .declaration(
            concept("EnumDeclaration")
                .extends("Declaration")
                .property(PropertyBuilder::object("properties", "EnumProperty").array())
                .build(),
        )
        .declaration(
            decorated(
                concept("MapKeyType")
                    .abstract_()
                    .property(PropertyBuilder::object("type", "TypeIdentifier").optional()),
            )
            .build(),
        )
        .declaration(concept("StringMapKeyType").extends("MapKeyType").build())
        .declaration(concept("DateTimeMapKeyType").extends("MapKeyType").build())
        .declaration(concept("ObjectMapKeyType").extends("MapKeyType").build())
        .declaration(
            decorated(
                concept("MapValueType")
                    .abstract_()
                    .property(PropertyBuilder::object("type", "TypeIdentifier").optional()),
            )
            .build(),
        )
        .declaration(concept("BooleanMapValueType").extends("MapValueType").build())
        .declaration(concept("StringMapValueType").extends("MapValueType").build())
        .declaration(concept("DateTimeMapValueType").extends("MapValueType").build())
        .declaration(concept("IntegerMapValueType").extends("MapValueType").build())
        .declaration(concept("LongMapValueType").extends("MapValueType").build())
        .declaration(concept("DoubleMapValueType").extends("MapValueType").build())
        .declaration(concept("ObjectMapValueType").extends("MapValueType").build())
        .declaration(concept("RelationshipMapValueType").extends("MapValueType").build())
        .declaration(
            concept("MapDeclaration")
                .extends("Declaration")
                .property(PropertyBuilder::object("key", "MapKeyType"))
                .property(PropertyBuilder::object("value", "MapValueType"))
                .build(),
        )
        .declaration(concept("ScalarDeclaration").abstract_().extends("Declaration").build())
        .declaration(scalar("BooleanScalar", PropertyBuilder::boolean("defaultValue")).build())
        .declaration(
            scalar("IntegerScalar", PropertyBuilder::integer("defaultValue"))
                .property(PropertyBuilder::object("validator", "IntegerDomainValidator").optional())
                .build(),
        )
        .declaration(
            scalar("LongScalar", PropertyBuilder::long("defaultValue"))
                .property(PropertyBuilder::object("validator", "LongDomainValidator").optional())
                .build(),
        )
        .declaration(
            scalar("DoubleScalar", PropertyBuilder::double("defaultValue"))
                .property(PropertyBuilder::object("validator", "DoubleDomainValidator").optional())
                .build(),
        )
        .declaration(
            scalar("StringScalar", PropertyBuilder::string("defaultValue"))
                .property(PropertyBuilder::object("validator", "StringRegexValidator").optional())
                .property(
                    PropertyBuilder::object("lengthValidator", "StringLengthValidator").optional(),
                )
                .build(),
        )
        .declaration(scalar("DateTimeScalar", PropertyBuilder::string("defaultValue")).build())
        // Imports and models
        .declaration(
            concept("Import")
                .abstract_()
                .property(PropertyBuilder::string("namespace"))
                .property(PropertyBuilder::string("uri").optional())
                .build(),
        )
        .declaration(concept("ImportAll").extends("Import").build())
        .declaration(
            concept("ImportType")
                .extends("Import")
                .property(PropertyBuilder::string("name"))
                .build(),
        )
        .declaration(
            concept("AliasedType")
                .property(PropertyBuilder::string("name"))
                .property(PropertyBuilder::string("aliasedName"))
                .build(),
        )
        .declaration(
            concept("ImportTypes")
                .extends("Import")
                .property(PropertyBuilder::string("types").array())
                .property(
                    PropertyBuilder::object("aliasedTypes", "AliasedType")
                        .array()
                        .optional(),
                )
                .build(),
        )
        .declaration(
            concept("Model")
                .property(PropertyBuilder::object("decorators", "Decorator").array().optional())
                .property(PropertyBuilder::string("namespace"))
                .property(PropertyBuilder::object("imports", "Import").array().optional())
                .property(
                    PropertyBuilder::object("declarations", "Declaration")
                        .array()
                        .optional(),
                )
                .property(PropertyBuilder::string("sourceUri").optional())
                .property(PropertyBuilder::string("concertoVersion").optional())
                .build(),
        )
        .declaration(
            concept("Models")
                .property(PropertyBuilder::object("models", "Model").array())
                .build(),
        )
        .build()
}
