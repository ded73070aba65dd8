//! The canonical JSON AST of a model file.
//!
//! Every node carries a `$class` discriminator from the
//! `concerto.metamodel@1.0.0` namespace. Polymorphic positions are closed
//! enums tagged by that discriminator; monomorphic nodes carry a zero-sized
//! tag that serializes to its fixed class name and rejects anything else.
//!
//! Struct field order defines the canonical key order of serialized ASTs.

use std::fmt;

use serde::{Deserialize, Serialize};
use taxon_foundation::Primitive;

/// Declares a zero-sized `$class` tag for a monomorphic metamodel node.
macro_rules! class_tag {
    ($tag:ident, $short:literal) => {
        #[doc = concat!("`$class` tag for `concerto.metamodel@1.0.0.", $short, "`.")]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $tag;

        impl $tag {
            /// The fully-qualified class name.
            pub const CLASS: &'static str = concat!("concerto.metamodel@1.0.0.", $short);
        }

        impl Serialize for $tag {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(Self::CLASS)
            }
        }

        impl<'de> Deserialize<'de> for $tag {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let class = String::deserialize(deserializer)?;
                if class == Self::CLASS {
                    Ok(Self)
                } else {
                    Err(serde::de::Error::custom(format!(
                        "expected $class {}, found {class}",
                        Self::CLASS
                    )))
                }
            }
        }
    };
}

class_tag!(ModelTag, "Model");
class_tag!(ModelsTag, "Models");
class_tag!(DecoratorTag, "Decorator");
class_tag!(TypeIdentifierTag, "TypeIdentifier");
class_tag!(PositionTag, "Position");
class_tag!(RangeTag, "Range");
class_tag!(AliasedTypeTag, "AliasedType");
class_tag!(EnumPropertyTag, "EnumProperty");
class_tag!(StringLengthValidatorTag, "StringLengthValidator");

fn is_false(value: &bool) -> bool {
    !*value
}

// =============================================================================
// Locations
// =============================================================================

/// A point in source text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: PositionTag,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// 0-based byte offset.
    pub offset: usize,
}

/// A span of source text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: RangeTag,
    /// Start of the span.
    pub start: Position,
    /// End of the span.
    pub end: Position,
    /// Source file, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Range {
    /// Creates a range between two line/column points.
    #[must_use]
    pub fn new(start: (usize, usize), end: (usize, usize)) -> Self {
        Self {
            class: RangeTag,
            start: Position {
                line: start.0,
                column: start.1,
                ..Position::default()
            },
            end: Position {
                line: end.0,
                column: end.1,
                ..Position::default()
            },
            source: None,
        }
    }
}

// =============================================================================
// Type references
// =============================================================================

/// A reference to a declared type, optionally namespace-qualified.
///
/// Unresolved ASTs carry only the short name; resolved ASTs fill in the
/// namespace of the declaring model file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeIdentifier {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: TypeIdentifierTag,
    /// Short (or aliased) type name.
    pub name: String,
    /// Declaring namespace, once resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl TypeIdentifier {
    /// Creates an unresolved type reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: TypeIdentifierTag,
            name: name.into(),
            namespace: None,
        }
    }

    /// Creates a namespace-qualified type reference.
    #[must_use]
    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class: TypeIdentifierTag,
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Returns the fully-qualified name, if resolved.
    #[must_use]
    pub fn fully_qualified_name(&self) -> Option<String> {
        self.namespace
            .as_deref()
            .map(|ns| taxon_foundation::fully_qualified_name(ns, &self.name))
    }
}

// =============================================================================
// Decorators
// =============================================================================

/// A named annotation with ordered literal arguments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Decorator {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: DecoratorTag,
    /// Decorator name without the `@`.
    pub name: String,
    /// Ordered arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<DecoratorArgument>,
    /// Source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

impl Decorator {
    /// Creates a decorator without arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: DecoratorTag,
            name: name.into(),
            arguments: Vec::new(),
            location: None,
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn with_argument(mut self, argument: DecoratorArgument) -> Self {
        self.arguments.push(argument);
        self
    }
}

/// A decorator argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum DecoratorArgument {
    /// A string literal.
    #[serde(rename = "concerto.metamodel@1.0.0.DecoratorString")]
    String {
        /// The value.
        value: String,
    },
    /// A numeric literal.
    #[serde(rename = "concerto.metamodel@1.0.0.DecoratorNumber")]
    Number {
        /// The value.
        value: f64,
    },
    /// A boolean literal.
    #[serde(rename = "concerto.metamodel@1.0.0.DecoratorBoolean")]
    Boolean {
        /// The value.
        value: bool,
    },
    /// A reference to a declared type.
    #[serde(rename = "concerto.metamodel@1.0.0.DecoratorTypeReference")]
    TypeReference {
        /// The referenced type.
        #[serde(rename = "type")]
        type_ref: TypeIdentifier,
        /// Whether the reference is to an array of the type.
        #[serde(rename = "isArray", default)]
        is_array: bool,
    },
}

impl DecoratorArgument {
    /// Creates a string argument.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String {
            value: value.into(),
        }
    }

    /// Returns the string value of a string argument.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String { value } => Some(value),
            _ => None,
        }
    }
}

// =============================================================================
// Literals and validators
// =============================================================================

/// A default value attached to a field or scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Boolean default.
    Boolean(bool),
    /// Integer or Long default.
    Integer(i64),
    /// Double default.
    Double(f64),
    /// String or DateTime default.
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::String(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Regular-expression validator for strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexValidator {
    /// The pattern, without delimiters.
    pub pattern: String,
    /// Flags such as `i` or `u`.
    #[serde(default)]
    pub flags: String,
}

/// Inclusive integer bounds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerDomain {
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<i64>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<i64>,
}

/// Inclusive floating-point bounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleDomain {
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// A pattern or range validator attached to a field or scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum FieldValidator {
    /// String pattern.
    #[serde(rename = "concerto.metamodel@1.0.0.StringRegexValidator")]
    StringRegex(RegexValidator),
    /// Integer range.
    #[serde(rename = "concerto.metamodel@1.0.0.IntegerDomainValidator")]
    IntegerDomain(IntegerDomain),
    /// Long range.
    #[serde(rename = "concerto.metamodel@1.0.0.LongDomainValidator")]
    LongDomain(IntegerDomain),
    /// Double range.
    #[serde(rename = "concerto.metamodel@1.0.0.DoubleDomainValidator")]
    DoubleDomain(DoubleDomain),
}

/// Length constraint for strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthValidator {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: StringLengthValidatorTag,
    /// Minimum length in characters.
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    /// Maximum length in characters.
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
}

// =============================================================================
// Properties
// =============================================================================

/// A field or relationship of a class declaration.
///
/// One shape serves every property kind; which parts are meaningful depends
/// on the [`Property`] variant wrapping it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Property name.
    pub name: String,
    /// Whether the property holds an array.
    #[serde(rename = "isArray", default)]
    pub is_array: bool,
    /// Whether the property may be absent.
    #[serde(rename = "isOptional", default)]
    pub is_optional: bool,
    /// Referenced type for object and relationship properties.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeIdentifier>,
    /// Default value.
    #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Literal>,
    /// Pattern or range validator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<FieldValidator>,
    /// String length validator.
    #[serde(rename = "lengthValidator", skip_serializing_if = "Option::is_none")]
    pub length_validator: Option<LengthValidator>,
    /// Attached decorators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    /// Source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

/// A property of a class declaration, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum Property {
    /// `o Boolean`
    #[serde(rename = "concerto.metamodel@1.0.0.BooleanProperty")]
    Boolean(Field),
    /// `o String`
    #[serde(rename = "concerto.metamodel@1.0.0.StringProperty")]
    String(Field),
    /// `o Integer`
    #[serde(rename = "concerto.metamodel@1.0.0.IntegerProperty")]
    Integer(Field),
    /// `o Long`
    #[serde(rename = "concerto.metamodel@1.0.0.LongProperty")]
    Long(Field),
    /// `o Double`
    #[serde(rename = "concerto.metamodel@1.0.0.DoubleProperty")]
    Double(Field),
    /// `o DateTime`
    #[serde(rename = "concerto.metamodel@1.0.0.DateTimeProperty")]
    DateTime(Field),
    /// `o SomeDeclaredType`
    #[serde(rename = "concerto.metamodel@1.0.0.ObjectProperty")]
    Object(Field),
    /// `--> SomeIdentifiedType`
    #[serde(rename = "concerto.metamodel@1.0.0.RelationshipProperty")]
    Relationship(Field),
}

impl Property {
    /// Returns the shared field data.
    #[must_use]
    pub const fn field(&self) -> &Field {
        match self {
            Self::Boolean(f)
            | Self::String(f)
            | Self::Integer(f)
            | Self::Long(f)
            | Self::Double(f)
            | Self::DateTime(f)
            | Self::Object(f)
            | Self::Relationship(f) => f,
        }
    }

    /// Returns the shared field data mutably.
    pub fn field_mut(&mut self) -> &mut Field {
        match self {
            Self::Boolean(f)
            | Self::String(f)
            | Self::Integer(f)
            | Self::Long(f)
            | Self::Double(f)
            | Self::DateTime(f)
            | Self::Object(f)
            | Self::Relationship(f) => f,
        }
    }

    /// The property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.field().name
    }

    /// The `$class` discriminator.
    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "concerto.metamodel@1.0.0.BooleanProperty",
            Self::String(_) => "concerto.metamodel@1.0.0.StringProperty",
            Self::Integer(_) => "concerto.metamodel@1.0.0.IntegerProperty",
            Self::Long(_) => "concerto.metamodel@1.0.0.LongProperty",
            Self::Double(_) => "concerto.metamodel@1.0.0.DoubleProperty",
            Self::DateTime(_) => "concerto.metamodel@1.0.0.DateTimeProperty",
            Self::Object(_) => "concerto.metamodel@1.0.0.ObjectProperty",
            Self::Relationship(_) => "concerto.metamodel@1.0.0.RelationshipProperty",
        }
    }

    /// The primitive type of a primitive-typed property.
    #[must_use]
    pub const fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::Boolean(_) => Some(Primitive::Boolean),
            Self::String(_) => Some(Primitive::String),
            Self::Integer(_) => Some(Primitive::Integer),
            Self::Long(_) => Some(Primitive::Long),
            Self::Double(_) => Some(Primitive::Double),
            Self::DateTime(_) => Some(Primitive::DateTime),
            Self::Object(_) | Self::Relationship(_) => None,
        }
    }

    /// Returns true for relationship properties.
    #[must_use]
    pub const fn is_relationship(&self) -> bool {
        matches!(self, Self::Relationship(_))
    }

    /// Returns true for array properties.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.field().is_array
    }

    /// Returns true for optional properties.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.field().is_optional
    }

    /// The short type name as written in the model.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self.primitive() {
            Some(p) => p.name(),
            None => self.field().type_ref.as_ref().map_or("", |t| t.name.as_str()),
        }
    }
}

/// One value of an enum declaration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: EnumPropertyTag,
    /// The value's name.
    pub name: String,
    /// Attached decorators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    /// Source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

// =============================================================================
// Declarations
// =============================================================================

/// How a class declaration is identified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum Identified {
    /// `identified`: the system `$identifier` field.
    #[serde(rename = "concerto.metamodel@1.0.0.Identified")]
    System,
    /// `identified by <field>`.
    #[serde(rename = "concerto.metamodel@1.0.0.IdentifiedBy")]
    By {
        /// The identifying field.
        name: String,
    },
}

/// A concept, asset, participant, transaction or event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    /// Short name.
    pub name: String,
    /// Whether the class is abstract.
    #[serde(rename = "isAbstract", default)]
    pub is_abstract: bool,
    /// Identifier declaration, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identified: Option<Identified>,
    /// Explicit super type.
    #[serde(rename = "superType", skip_serializing_if = "Option::is_none")]
    pub super_type: Option<TypeIdentifier>,
    /// Own properties.
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Attached decorators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    /// Source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

/// An enum declaration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    /// Short name.
    pub name: String,
    /// Values, in declaration order.
    #[serde(default)]
    pub properties: Vec<EnumValue>,
    /// Attached decorators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    /// Source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

/// Shared shape of map key and value type descriptors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapElement {
    /// Referenced type for object, relationship or scalar elements.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeIdentifier>,
    /// Attached decorators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    /// Source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

/// The key type of a map declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum MapKeyType {
    /// String keys.
    #[serde(rename = "concerto.metamodel@1.0.0.StringMapKeyType")]
    String(MapElement),
    /// Date-time keys.
    #[serde(rename = "concerto.metamodel@1.0.0.DateTimeMapKeyType")]
    DateTime(MapElement),
    /// Scalar-typed keys.
    #[serde(rename = "concerto.metamodel@1.0.0.ObjectMapKeyType")]
    Object(MapElement),
}

/// The value type of a map declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum MapValueType {
    /// Boolean values.
    #[serde(rename = "concerto.metamodel@1.0.0.BooleanMapValueType")]
    Boolean(MapElement),
    /// String values.
    #[serde(rename = "concerto.metamodel@1.0.0.StringMapValueType")]
    String(MapElement),
    /// Date-time values.
    #[serde(rename = "concerto.metamodel@1.0.0.DateTimeMapValueType")]
    DateTime(MapElement),
    /// Integer values.
    #[serde(rename = "concerto.metamodel@1.0.0.IntegerMapValueType")]
    Integer(MapElement),
    /// Long values.
    #[serde(rename = "concerto.metamodel@1.0.0.LongMapValueType")]
    Long(MapElement),
    /// Double values.
    #[serde(rename = "concerto.metamodel@1.0.0.DoubleMapValueType")]
    Double(MapElement),
    /// Concept or scalar values.
    #[serde(rename = "concerto.metamodel@1.0.0.ObjectMapValueType")]
    Object(MapElement),
    /// Relationship values.
    #[serde(rename = "concerto.metamodel@1.0.0.RelationshipMapValueType")]
    Relationship(MapElement),
}

impl MapKeyType {
    /// The shared element data.
    #[must_use]
    pub const fn element(&self) -> &MapElement {
        match self {
            Self::String(e) | Self::DateTime(e) | Self::Object(e) => e,
        }
    }

    /// The shared element data, mutably.
    pub fn element_mut(&mut self) -> &mut MapElement {
        match self {
            Self::String(e) | Self::DateTime(e) | Self::Object(e) => e,
        }
    }

    /// The `$class` discriminator.
    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::String(_) => "concerto.metamodel@1.0.0.StringMapKeyType",
            Self::DateTime(_) => "concerto.metamodel@1.0.0.DateTimeMapKeyType",
            Self::Object(_) => "concerto.metamodel@1.0.0.ObjectMapKeyType",
        }
    }
}

impl MapValueType {
    /// The shared element data.
    #[must_use]
    pub const fn element(&self) -> &MapElement {
        match self {
            Self::Boolean(e)
            | Self::String(e)
            | Self::DateTime(e)
            | Self::Integer(e)
            | Self::Long(e)
            | Self::Double(e)
            | Self::Object(e)
            | Self::Relationship(e) => e,
        }
    }

    /// The shared element data, mutably.
    pub fn element_mut(&mut self) -> &mut MapElement {
        match self {
            Self::Boolean(e)
            | Self::String(e)
            | Self::DateTime(e)
            | Self::Integer(e)
            | Self::Long(e)
            | Self::Double(e)
            | Self::Object(e)
            | Self::Relationship(e) => e,
        }
    }

    /// The `$class` discriminator.
    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "concerto.metamodel@1.0.0.BooleanMapValueType",
            Self::String(_) => "concerto.metamodel@1.0.0.StringMapValueType",
            Self::DateTime(_) => "concerto.metamodel@1.0.0.DateTimeMapValueType",
            Self::Integer(_) => "concerto.metamodel@1.0.0.IntegerMapValueType",
            Self::Long(_) => "concerto.metamodel@1.0.0.LongMapValueType",
            Self::Double(_) => "concerto.metamodel@1.0.0.DoubleMapValueType",
            Self::Object(_) => "concerto.metamodel@1.0.0.ObjectMapValueType",
            Self::Relationship(_) => "concerto.metamodel@1.0.0.RelationshipMapValueType",
        }
    }

    /// The primitive type of a primitive-valued map.
    #[must_use]
    pub const fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::Boolean(_) => Some(Primitive::Boolean),
            Self::String(_) => Some(Primitive::String),
            Self::DateTime(_) => Some(Primitive::DateTime),
            Self::Integer(_) => Some(Primitive::Integer),
            Self::Long(_) => Some(Primitive::Long),
            Self::Double(_) => Some(Primitive::Double),
            Self::Object(_) | Self::Relationship(_) => None,
        }
    }
}

/// A map declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDeclaration {
    /// Short name.
    pub name: String,
    /// Key type.
    pub key: MapKeyType,
    /// Value type.
    pub value: MapValueType,
    /// Attached decorators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    /// Source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

/// A scalar declaration wrapping one primitive type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarDeclaration {
    /// Short name.
    pub name: String,
    /// Default value.
    #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Literal>,
    /// Pattern or range validator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<FieldValidator>,
    /// String length validator.
    #[serde(rename = "lengthValidator", skip_serializing_if = "Option::is_none")]
    pub length_validator: Option<LengthValidator>,
    /// Attached decorators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    /// Source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

/// The kind of a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// `concept`
    Concept,
    /// `asset`
    Asset,
    /// `participant`
    Participant,
    /// `transaction`
    Transaction,
    /// `event`
    Event,
    /// `enum`
    Enum,
    /// `map`
    Map,
    /// `scalar`, with its wrapped primitive.
    Scalar(Primitive),
}

impl DeclarationKind {
    /// Returns true for concept, asset, participant, transaction and event.
    #[must_use]
    pub const fn is_class(self) -> bool {
        matches!(
            self,
            Self::Concept | Self::Asset | Self::Participant | Self::Transaction | Self::Event
        )
    }

    /// The root type name for class kinds.
    #[must_use]
    pub const fn root_type(self) -> Option<&'static str> {
        match self {
            Self::Concept => Some("Concept"),
            Self::Asset => Some("Asset"),
            Self::Participant => Some("Participant"),
            Self::Transaction => Some("Transaction"),
            Self::Event => Some("Event"),
            Self::Enum | Self::Map | Self::Scalar(_) => None,
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concept => write!(f, "concept"),
            Self::Asset => write!(f, "asset"),
            Self::Participant => write!(f, "participant"),
            Self::Transaction => write!(f, "transaction"),
            Self::Event => write!(f, "event"),
            Self::Enum => write!(f, "enum"),
            Self::Map => write!(f, "map"),
            Self::Scalar(p) => write!(f, "{p} scalar"),
        }
    }
}

/// A top-level declaration, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum Declaration {
    /// `concept`
    #[serde(rename = "concerto.metamodel@1.0.0.ConceptDeclaration")]
    Concept(ClassDeclaration),
    /// `asset`
    #[serde(rename = "concerto.metamodel@1.0.0.AssetDeclaration")]
    Asset(ClassDeclaration),
    /// `participant`
    #[serde(rename = "concerto.metamodel@1.0.0.ParticipantDeclaration")]
    Participant(ClassDeclaration),
    /// `transaction`
    #[serde(rename = "concerto.metamodel@1.0.0.TransactionDeclaration")]
    Transaction(ClassDeclaration),
    /// `event`
    #[serde(rename = "concerto.metamodel@1.0.0.EventDeclaration")]
    Event(ClassDeclaration),
    /// `enum`
    #[serde(rename = "concerto.metamodel@1.0.0.EnumDeclaration")]
    Enum(EnumDeclaration),
    /// `map`
    #[serde(rename = "concerto.metamodel@1.0.0.MapDeclaration")]
    Map(MapDeclaration),
    /// `scalar ... extends Boolean`
    #[serde(rename = "concerto.metamodel@1.0.0.BooleanScalar")]
    BooleanScalar(ScalarDeclaration),
    /// `scalar ... extends Integer`
    #[serde(rename = "concerto.metamodel@1.0.0.IntegerScalar")]
    IntegerScalar(ScalarDeclaration),
    /// `scalar ... extends Long`
    #[serde(rename = "concerto.metamodel@1.0.0.LongScalar")]
    LongScalar(ScalarDeclaration),
    /// `scalar ... extends Double`
    #[serde(rename = "concerto.metamodel@1.0.0.DoubleScalar")]
    DoubleScalar(ScalarDeclaration),
    /// `scalar ... extends String`
    #[serde(rename = "concerto.metamodel@1.0.0.StringScalar")]
    StringScalar(ScalarDeclaration),
    /// `scalar ... extends DateTime`
    #[serde(rename = "concerto.metamodel@1.0.0.DateTimeScalar")]
    DateTimeScalar(ScalarDeclaration),
}

impl Declaration {
    /// The declaration's kind.
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        match self {
            Self::Concept(_) => DeclarationKind::Concept,
            Self::Asset(_) => DeclarationKind::Asset,
            Self::Participant(_) => DeclarationKind::Participant,
            Self::Transaction(_) => DeclarationKind::Transaction,
            Self::Event(_) => DeclarationKind::Event,
            Self::Enum(_) => DeclarationKind::Enum,
            Self::Map(_) => DeclarationKind::Map,
            Self::BooleanScalar(_) => DeclarationKind::Scalar(Primitive::Boolean),
            Self::IntegerScalar(_) => DeclarationKind::Scalar(Primitive::Integer),
            Self::LongScalar(_) => DeclarationKind::Scalar(Primitive::Long),
            Self::DoubleScalar(_) => DeclarationKind::Scalar(Primitive::Double),
            Self::StringScalar(_) => DeclarationKind::Scalar(Primitive::String),
            Self::DateTimeScalar(_) => DeclarationKind::Scalar(Primitive::DateTime),
        }
    }

    /// The `$class` discriminator.
    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Concept(_) => "concerto.metamodel@1.0.0.ConceptDeclaration",
            Self::Asset(_) => "concerto.metamodel@1.0.0.AssetDeclaration",
            Self::Participant(_) => "concerto.metamodel@1.0.0.ParticipantDeclaration",
            Self::Transaction(_) => "concerto.metamodel@1.0.0.TransactionDeclaration",
            Self::Event(_) => "concerto.metamodel@1.0.0.EventDeclaration",
            Self::Enum(_) => "concerto.metamodel@1.0.0.EnumDeclaration",
            Self::Map(_) => "concerto.metamodel@1.0.0.MapDeclaration",
            Self::BooleanScalar(_) => "concerto.metamodel@1.0.0.BooleanScalar",
            Self::IntegerScalar(_) => "concerto.metamodel@1.0.0.IntegerScalar",
            Self::LongScalar(_) => "concerto.metamodel@1.0.0.LongScalar",
            Self::DoubleScalar(_) => "concerto.metamodel@1.0.0.DoubleScalar",
            Self::StringScalar(_) => "concerto.metamodel@1.0.0.StringScalar",
            Self::DateTimeScalar(_) => "concerto.metamodel@1.0.0.DateTimeScalar",
        }
    }

    /// Short name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Concept(c)
            | Self::Asset(c)
            | Self::Participant(c)
            | Self::Transaction(c)
            | Self::Event(c) => &c.name,
            Self::Enum(e) => &e.name,
            Self::Map(m) => &m.name,
            Self::BooleanScalar(s)
            | Self::IntegerScalar(s)
            | Self::LongScalar(s)
            | Self::DoubleScalar(s)
            | Self::StringScalar(s)
            | Self::DateTimeScalar(s) => &s.name,
        }
    }

    /// Attached decorators.
    #[must_use]
    pub fn decorators(&self) -> &[Decorator] {
        match self {
            Self::Concept(c)
            | Self::Asset(c)
            | Self::Participant(c)
            | Self::Transaction(c)
            | Self::Event(c) => &c.decorators,
            Self::Enum(e) => &e.decorators,
            Self::Map(m) => &m.decorators,
            Self::BooleanScalar(s)
            | Self::IntegerScalar(s)
            | Self::LongScalar(s)
            | Self::DoubleScalar(s)
            | Self::StringScalar(s)
            | Self::DateTimeScalar(s) => &s.decorators,
        }
    }

    /// Attached decorators, mutably.
    pub fn decorators_mut(&mut self) -> &mut Vec<Decorator> {
        match self {
            Self::Concept(c)
            | Self::Asset(c)
            | Self::Participant(c)
            | Self::Transaction(c)
            | Self::Event(c) => &mut c.decorators,
            Self::Enum(e) => &mut e.decorators,
            Self::Map(m) => &mut m.decorators,
            Self::BooleanScalar(s)
            | Self::IntegerScalar(s)
            | Self::LongScalar(s)
            | Self::DoubleScalar(s)
            | Self::StringScalar(s)
            | Self::DateTimeScalar(s) => &mut s.decorators,
        }
    }

    /// Source span.
    #[must_use]
    pub const fn location(&self) -> Option<&Range> {
        match self {
            Self::Concept(c)
            | Self::Asset(c)
            | Self::Participant(c)
            | Self::Transaction(c)
            | Self::Event(c) => c.location.as_ref(),
            Self::Enum(e) => e.location.as_ref(),
            Self::Map(m) => m.location.as_ref(),
            Self::BooleanScalar(s)
            | Self::IntegerScalar(s)
            | Self::LongScalar(s)
            | Self::DoubleScalar(s)
            | Self::StringScalar(s)
            | Self::DateTimeScalar(s) => s.location.as_ref(),
        }
    }

    /// The class declaration, for class kinds.
    #[must_use]
    pub const fn as_class(&self) -> Option<&ClassDeclaration> {
        match self {
            Self::Concept(c)
            | Self::Asset(c)
            | Self::Participant(c)
            | Self::Transaction(c)
            | Self::Event(c) => Some(c),
            _ => None,
        }
    }

    /// The class declaration, mutably, for class kinds.
    pub fn as_class_mut(&mut self) -> Option<&mut ClassDeclaration> {
        match self {
            Self::Concept(c)
            | Self::Asset(c)
            | Self::Participant(c)
            | Self::Transaction(c)
            | Self::Event(c) => Some(c),
            _ => None,
        }
    }

    /// The scalar declaration, for scalar kinds.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&ScalarDeclaration> {
        match self {
            Self::BooleanScalar(s)
            | Self::IntegerScalar(s)
            | Self::LongScalar(s)
            | Self::DoubleScalar(s)
            | Self::StringScalar(s)
            | Self::DateTimeScalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if the declaration is abstract.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.as_class().is_some_and(|c| c.is_abstract)
    }
}

// =============================================================================
// Imports and models
// =============================================================================

/// An aliased import: `import org.acme@1.0.0.{Car as Vehicle}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasedType {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: AliasedTypeTag,
    /// The imported type's declared name.
    pub name: String,
    /// The local alias.
    #[serde(rename = "aliasedName")]
    pub aliased_name: String,
}

/// An import statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum Import {
    /// `import org.acme.*`
    #[serde(rename = "concerto.metamodel@1.0.0.ImportAll")]
    All {
        /// Imported namespace.
        namespace: String,
        /// External location of the namespace.
        #[serde(skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
    /// `import org.acme@1.0.0.Car`
    #[serde(rename = "concerto.metamodel@1.0.0.ImportType")]
    Type {
        /// Imported namespace.
        namespace: String,
        /// Imported type.
        name: String,
        /// External location of the namespace.
        #[serde(skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
    /// `import org.acme@1.0.0.{Car, Truck as Lorry}`
    #[serde(rename = "concerto.metamodel@1.0.0.ImportTypes")]
    Types {
        /// Imported namespace.
        namespace: String,
        /// Imported type names.
        types: Vec<String>,
        /// Aliases for a subset of `types`.
        #[serde(rename = "aliasedTypes", default, skip_serializing_if = "Vec::is_empty")]
        aliased_types: Vec<AliasedType>,
        /// External location of the namespace.
        #[serde(skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
}

impl Import {
    /// The imported namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            Self::All { namespace, .. }
            | Self::Type { namespace, .. }
            | Self::Types { namespace, .. } => namespace,
        }
    }

    /// The external URI, if any.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::All { uri, .. } | Self::Type { uri, .. } | Self::Types { uri, .. } => {
                uri.as_deref()
            }
        }
    }

    /// `(declared name, local name)` pairs brought into scope.
    #[must_use]
    pub fn imported_names(&self) -> Vec<(String, String)> {
        match self {
            Self::All { .. } => Vec::new(),
            Self::Type { name, .. } => vec![(name.clone(), name.clone())],
            Self::Types {
                types,
                aliased_types,
                ..
            } => types
                .iter()
                .map(|t| {
                    let local = aliased_types
                        .iter()
                        .find(|a| &a.name == t)
                        .map_or_else(|| t.clone(), |a| a.aliased_name.clone());
                    (t.clone(), local)
                })
                .collect(),
        }
    }
}

/// One model file's AST.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: ModelTag,
    /// Namespace-level decorators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    /// The model's namespace.
    pub namespace: String,
    /// Imports.
    #[serde(default)]
    pub imports: Vec<Import>,
    /// Declarations.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Where the model was loaded from.
    #[serde(rename = "sourceUri", skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
    /// Required language version range.
    #[serde(rename = "concertoVersion", skip_serializing_if = "Option::is_none")]
    pub concerto_version: Option<String>,
}

impl Model {
    /// Creates an empty model for a namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Finds a declaration by short name.
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }

    /// Finds a declaration by short name, mutably.
    pub fn declaration_mut(&mut self, name: &str) -> Option<&mut Declaration> {
        self.declarations.iter_mut().find(|d| d.name() == name)
    }
}

/// A set of model ASTs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Models {
    /// Discriminator.
    #[serde(rename = "$class")]
    pub class: ModelsTag,
    /// The models.
    pub models: Vec<Model>,
}

impl Models {
    /// Wraps a list of models.
    #[must_use]
    pub fn new(models: Vec<Model>) -> Self {
        Self {
            class: ModelsTag,
            models,
        }
    }
}
