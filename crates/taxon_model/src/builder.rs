//! Fluent construction of model ASTs.
//!
//! ```
//! use taxon_model::builder::{ClassBuilder, ModelBuilder, PropertyBuilder};
//!
//! let model = ModelBuilder::new("org.acme@1.0.0")
//!     .declaration(
//!         ClassBuilder::asset("Vehicle")
//!             .identified_by("vin")
//!             .property(PropertyBuilder::string("vin"))
//!             .build(),
//!     )
//!     .build();
//! assert_eq!(model.declarations.len(), 1);
//! ```

use taxon_foundation::Primitive;

use crate::ast::{
    AliasedType, AliasedTypeTag, ClassDeclaration, Declaration, DeclarationKind, Decorator,
    DoubleDomain, EnumDeclaration, EnumValue, Field, FieldValidator, Identified, Import,
    IntegerDomain, LengthValidator, Literal, MapDeclaration, MapElement, MapKeyType, MapValueType,
    Model, Property, RegexValidator, ScalarDeclaration, StringLengthValidatorTag, TypeIdentifier,
};

// =============================================================================
// Models
// =============================================================================

/// Builds a [`Model`].
#[derive(Clone, Debug)]
pub struct ModelBuilder {
    model: Model,
}

impl ModelBuilder {
    /// Starts a model for a namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            model: Model::new(namespace),
        }
    }

    /// Sets the source URI.
    #[must_use]
    pub fn source_uri(mut self, uri: impl Into<String>) -> Self {
        self.model.source_uri = Some(uri.into());
        self
    }

    /// Adds a namespace-level decorator.
    #[must_use]
    pub fn decorator(mut self, decorator: Decorator) -> Self {
        self.model.decorators.push(decorator);
        self
    }

    /// Imports a single type.
    #[must_use]
    pub fn import_type(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.model.imports.push(Import::Type {
            namespace: namespace.into(),
            name: name.into(),
            uri: None,
        });
        self
    }

    /// Imports several types from one namespace.
    #[must_use]
    pub fn import_types(mut self, namespace: impl Into<String>, types: &[&str]) -> Self {
        self.model.imports.push(Import::Types {
            namespace: namespace.into(),
            types: types.iter().map(|t| (*t).to_string()).collect(),
            aliased_types: Vec::new(),
            uri: None,
        });
        self
    }

    /// Imports one type under a local alias.
    #[must_use]
    pub fn import_aliased(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.model.imports.push(Import::Types {
            namespace: namespace.into(),
            types: vec![name.clone()],
            aliased_types: vec![AliasedType {
                class: AliasedTypeTag,
                name,
                aliased_name: alias.into(),
            }],
            uri: None,
        });
        self
    }

    /// Imports a single type from an external location.
    #[must_use]
    pub fn import_external(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        self.model.imports.push(Import::Type {
            namespace: namespace.into(),
            name: name.into(),
            uri: Some(uri.into()),
        });
        self
    }

    /// Adds an arbitrary import.
    #[must_use]
    pub fn import(mut self, import: Import) -> Self {
        self.model.imports.push(import);
        self
    }

    /// Adds a declaration.
    #[must_use]
    pub fn declaration(mut self, declaration: Declaration) -> Self {
        self.model.declarations.push(declaration);
        self
    }

    /// Finishes the model.
    #[must_use]
    pub fn build(self) -> Model {
        self.model
    }
}

// =============================================================================
// Class declarations
// =============================================================================

/// Builds a class [`Declaration`].
#[derive(Clone, Debug)]
pub struct ClassBuilder {
    kind: DeclarationKind,
    decl: ClassDeclaration,
}

impl ClassBuilder {
    fn of(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            decl: ClassDeclaration {
                name: name.into(),
                ..ClassDeclaration::default()
            },
        }
    }

    /// Starts a concept.
    #[must_use]
    pub fn concept(name: impl Into<String>) -> Self {
        Self::of(DeclarationKind::Concept, name)
    }

    /// Starts an asset.
    #[must_use]
    pub fn asset(name: impl Into<String>) -> Self {
        Self::of(DeclarationKind::Asset, name)
    }

    /// Starts a participant.
    #[must_use]
    pub fn participant(name: impl Into<String>) -> Self {
        Self::of(DeclarationKind::Participant, name)
    }

    /// Starts a transaction.
    #[must_use]
    pub fn transaction(name: impl Into<String>) -> Self {
        Self::of(DeclarationKind::Transaction, name)
    }

    /// Starts an event.
    #[must_use]
    pub fn event(name: impl Into<String>) -> Self {
        Self::of(DeclarationKind::Event, name)
    }

    /// Marks the class abstract.
    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.decl.is_abstract = true;
        self
    }

    /// Uses the system identifier.
    #[must_use]
    pub fn identified(mut self) -> Self {
        self.decl.identified = Some(Identified::System);
        self
    }

    /// Identifies instances by a field.
    #[must_use]
    pub fn identified_by(mut self, field: impl Into<String>) -> Self {
        self.decl.identified = Some(Identified::By { name: field.into() });
        self
    }

    /// Sets the super type by (local or imported) short name.
    #[must_use]
    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.decl.super_type = Some(TypeIdentifier::new(name));
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.decl.properties.push(property.build());
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn decorator(mut self, decorator: Decorator) -> Self {
        self.decl.decorators.push(decorator);
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> Declaration {
        match self.kind {
            DeclarationKind::Asset => Declaration::Asset(self.decl),
            DeclarationKind::Participant => Declaration::Participant(self.decl),
            DeclarationKind::Transaction => Declaration::Transaction(self.decl),
            DeclarationKind::Event => Declaration::Event(self.decl),
            _ => Declaration::Concept(self.decl),
        }
    }
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Clone, Copy, Debug)]
enum PropertyKind {
    Primitive(Primitive),
    Object,
    Relationship,
}

/// Builds a [`Property`].
#[derive(Clone, Debug)]
pub struct PropertyBuilder {
    kind: PropertyKind,
    field: Field,
}

impl PropertyBuilder {
    fn primitive(primitive: Primitive, name: impl Into<String>) -> Self {
        Self {
            kind: PropertyKind::Primitive(primitive),
            field: Field {
                name: name.into(),
                ..Field::default()
            },
        }
    }

    /// `o Boolean name`
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::primitive(Primitive::Boolean, name)
    }

    /// `o String name`
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::primitive(Primitive::String, name)
    }

    /// `o Integer name`
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::primitive(Primitive::Integer, name)
    }

    /// `o Long name`
    #[must_use]
    pub fn long(name: impl Into<String>) -> Self {
        Self::primitive(Primitive::Long, name)
    }

    /// `o Double name`
    #[must_use]
    pub fn double(name: impl Into<String>) -> Self {
        Self::primitive(Primitive::Double, name)
    }

    /// `o DateTime name`
    #[must_use]
    pub fn date_time(name: impl Into<String>) -> Self {
        Self::primitive(Primitive::DateTime, name)
    }

    /// `o TypeName name`
    #[must_use]
    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            kind: PropertyKind::Object,
            field: Field {
                name: name.into(),
                type_ref: Some(TypeIdentifier::new(type_name)),
                ..Field::default()
            },
        }
    }

    /// `--> TypeName name`
    #[must_use]
    pub fn relationship(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            kind: PropertyKind::Relationship,
            field: Field {
                name: name.into(),
                type_ref: Some(TypeIdentifier::new(type_name)),
                ..Field::default()
            },
        }
    }

    /// Marks the property optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.field.is_optional = true;
        self
    }

    /// Marks the property as an array.
    #[must_use]
    pub fn array(mut self) -> Self {
        self.field.is_array = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: Literal) -> Self {
        self.field.default_value = Some(value);
        self
    }

    /// Adds a regular-expression validator.
    #[must_use]
    pub fn regex(mut self, pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        self.field.validator = Some(FieldValidator::StringRegex(RegexValidator {
            pattern: pattern.into(),
            flags: flags.into(),
        }));
        self
    }

    /// Adds a length validator.
    #[must_use]
    pub fn length(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.field.length_validator = Some(length_validator(min, max));
        self
    }

    /// Adds an integer range validator, choosing Integer or Long by kind.
    #[must_use]
    pub fn range(mut self, lower: Option<i64>, upper: Option<i64>) -> Self {
        let domain = IntegerDomain { lower, upper };
        self.field.validator = Some(match self.kind {
            PropertyKind::Primitive(Primitive::Long) => FieldValidator::LongDomain(domain),
            _ => FieldValidator::IntegerDomain(domain),
        });
        self
    }

    /// Adds a floating-point range validator.
    #[must_use]
    pub fn double_range(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.field.validator = Some(FieldValidator::DoubleDomain(DoubleDomain { lower, upper }));
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn decorator(mut self, decorator: Decorator) -> Self {
        self.field.decorators.push(decorator);
        self
    }

    /// Finishes the property.
    #[must_use]
    pub fn build(self) -> Property {
        match self.kind {
            PropertyKind::Primitive(Primitive::Boolean) => Property::Boolean(self.field),
            PropertyKind::Primitive(Primitive::String) => Property::String(self.field),
            PropertyKind::Primitive(Primitive::Integer) => Property::Integer(self.field),
            PropertyKind::Primitive(Primitive::Long) => Property::Long(self.field),
            PropertyKind::Primitive(Primitive::Double) => Property::Double(self.field),
            PropertyKind::Primitive(Primitive::DateTime) => Property::DateTime(self.field),
            PropertyKind::Object => Property::Object(self.field),
            PropertyKind::Relationship => Property::Relationship(self.field),
        }
    }
}

fn length_validator(min: Option<i64>, max: Option<i64>) -> LengthValidator {
    LengthValidator {
        class: StringLengthValidatorTag,
        min_length: min,
        max_length: max,
    }
}

// =============================================================================
// Enums, scalars, maps
// =============================================================================

/// Builds an enum declaration from value names.
#[must_use]
pub fn enumeration(name: impl Into<String>, values: &[&str]) -> Declaration {
    Declaration::Enum(EnumDeclaration {
        name: name.into(),
        properties: values
            .iter()
            .map(|v| EnumValue {
                name: (*v).to_string(),
                ..EnumValue::default()
            })
            .collect(),
        ..EnumDeclaration::default()
    })
}

/// Builds a scalar [`Declaration`].
#[derive(Clone, Debug)]
pub struct ScalarBuilder {
    primitive: Primitive,
    decl: ScalarDeclaration,
}

impl ScalarBuilder {
    /// Starts a scalar wrapping a primitive.
    #[must_use]
    pub fn new(primitive: Primitive, name: impl Into<String>) -> Self {
        Self {
            primitive,
            decl: ScalarDeclaration {
                name: name.into(),
                ..ScalarDeclaration::default()
            },
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: Literal) -> Self {
        self.decl.default_value = Some(value);
        self
    }

    /// Sets a pattern or range validator.
    #[must_use]
    pub fn validator(mut self, validator: FieldValidator) -> Self {
        self.decl.validator = Some(validator);
        self
    }

    /// Sets a length validator.
    #[must_use]
    pub fn length(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.decl.length_validator = Some(length_validator(min, max));
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn decorator(mut self, decorator: Decorator) -> Self {
        self.decl.decorators.push(decorator);
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> Declaration {
        match self.primitive {
            Primitive::Boolean => Declaration::BooleanScalar(self.decl),
            Primitive::String => Declaration::StringScalar(self.decl),
            Primitive::Integer => Declaration::IntegerScalar(self.decl),
            Primitive::Long => Declaration::LongScalar(self.decl),
            Primitive::Double => Declaration::DoubleScalar(self.decl),
            Primitive::DateTime => Declaration::DateTimeScalar(self.decl),
        }
    }
}

/// Map key with a primitive String or DateTime type, or a named scalar.
#[must_use]
pub fn map_key(type_name: &str) -> MapKeyType {
    match Primitive::from_name(type_name) {
        Some(Primitive::String) => MapKeyType::String(MapElement::default()),
        Some(Primitive::DateTime) => MapKeyType::DateTime(MapElement::default()),
        _ => MapKeyType::Object(MapElement {
            type_ref: Some(TypeIdentifier::new(type_name)),
            ..MapElement::default()
        }),
    }
}

/// Map value with a primitive type or a named declaration.
#[must_use]
pub fn map_value(type_name: &str) -> MapValueType {
    let element = MapElement::default;
    match Primitive::from_name(type_name) {
        Some(Primitive::Boolean) => MapValueType::Boolean(element()),
        Some(Primitive::String) => MapValueType::String(element()),
        Some(Primitive::DateTime) => MapValueType::DateTime(element()),
        Some(Primitive::Integer) => MapValueType::Integer(element()),
        Some(Primitive::Long) => MapValueType::Long(element()),
        Some(Primitive::Double) => MapValueType::Double(element()),
        None => MapValueType::Object(MapElement {
            type_ref: Some(TypeIdentifier::new(type_name)),
            ..element()
        }),
    }
}

/// Map value holding relationships to a named declaration.
#[must_use]
pub fn map_relationship_value(type_name: &str) -> MapValueType {
    MapValueType::Relationship(MapElement {
        type_ref: Some(TypeIdentifier::new(type_name)),
        ..MapElement::default()
    })
}

/// Builds a map declaration.
#[must_use]
pub fn map(name: impl Into<String>, key: MapKeyType, value: MapValueType) -> Declaration {
    Declaration::Map(MapDeclaration {
        name: name.into(),
        key,
        value,
        decorators: Vec::new(),
        location: None,
    })
}

/// Builds a decorator with string arguments.
#[must_use]
pub fn decorator(name: &str, arguments: &[&str]) -> Decorator {
    arguments.iter().fold(Decorator::new(name), |d, a| {
        d.with_argument(crate::ast::DecoratorArgument::string(*a))
    })
}
