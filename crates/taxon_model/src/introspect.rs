//! Inheritance-aware views over declarations and properties.
//!
//! A [`DeclarationRef`] pairs a declaration with its model file and the
//! registry it lives in. Super types are stored as names and resolved
//! through the registry on every walk, so files can be loaded in any order.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use taxon_foundation::{
    Error, ErrorContext, ErrorKind, IDENTIFIER_PROPERTY, Primitive, ROOT_NAMESPACE, Result,
    fully_qualified_name, is_reserved_property, is_valid_identifier,
};

use crate::ast::{
    ClassDeclaration, Declaration, DeclarationKind, Decorator, EnumDeclaration, EnumValue, Field,
    FieldValidator, Identified, Literal, MapDeclaration, MapKeyType, MapValueType, Property,
    ScalarDeclaration, TypeIdentifier,
};
use crate::model_file::ModelFile;
use crate::registry::ModelManager;
use crate::validator::{NumberValidator, StringValidator};

// =============================================================================
// Resolved types
// =============================================================================

/// How instances of a class are identified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentifierField {
    /// The system `$identifier` field.
    System,
    /// A declared String field.
    Explicit(String),
}

impl IdentifierField {
    /// The name of the field holding the identifier.
    #[must_use]
    pub fn field_name(&self) -> &str {
        match self {
            Self::System => IDENTIFIER_PROPERTY,
            Self::Explicit(name) => name,
        }
    }
}

/// A property's type after name resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedType {
    /// A primitive type.
    Primitive(Primitive),
    /// A declared type, by fully-qualified name.
    Declared(String),
}

/// What a property (or map element) holds.
#[derive(Clone, Copy, Debug)]
pub enum PropertyTarget<'a> {
    /// A primitive value.
    Primitive(Primitive),
    /// A scalar wrapping a primitive.
    Scalar(DeclarationRef<'a>, Primitive),
    /// One of an enum's values.
    Enum(DeclarationRef<'a>),
    /// An instance of a class declaration.
    Class(DeclarationRef<'a>),
    /// A map instance.
    Map(DeclarationRef<'a>),
}

impl<'a> PropertyTarget<'a> {
    fn of(decl: DeclarationRef<'a>) -> Self {
        match decl.kind() {
            DeclarationKind::Enum => Self::Enum(decl),
            DeclarationKind::Map => Self::Map(decl),
            DeclarationKind::Scalar(p) => Self::Scalar(decl, p),
            _ => Self::Class(decl),
        }
    }

    /// The underlying primitive of primitive and scalar targets.
    #[must_use]
    pub const fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::Primitive(p) | Self::Scalar(_, p) => Some(*p),
            Self::Enum(_) | Self::Class(_) | Self::Map(_) => None,
        }
    }

    /// The declaration of non-primitive targets.
    #[must_use]
    pub const fn declaration(&self) -> Option<DeclarationRef<'a>> {
        match self {
            Self::Primitive(_) => None,
            Self::Scalar(d, _) | Self::Enum(d) | Self::Class(d) | Self::Map(d) => Some(*d),
        }
    }
}

/// Resolved key and value types of a map declaration.
#[derive(Clone, Copy, Debug)]
pub struct MapTypes<'a> {
    /// Key type.
    pub key: PropertyTarget<'a>,
    /// Value type.
    pub value: PropertyTarget<'a>,
    /// Whether values are relationships.
    pub value_is_relationship: bool,
}

// =============================================================================
// DeclarationRef
// =============================================================================

/// A declaration together with its model file and registry.
#[derive(Clone, Copy)]
pub struct DeclarationRef<'a> {
    manager: &'a ModelManager,
    file: &'a ModelFile,
    declaration: &'a Declaration,
}

impl fmt::Debug for DeclarationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarationRef")
            .field("fqn", &self.fully_qualified_name())
            .field("kind", &self.kind())
            .finish()
    }
}

impl<'a> DeclarationRef<'a> {
    pub(crate) const fn new(
        manager: &'a ModelManager,
        file: &'a ModelFile,
        declaration: &'a Declaration,
    ) -> Self {
        Self {
            manager,
            file,
            declaration,
        }
    }

    /// The owning registry.
    #[must_use]
    pub const fn manager(&self) -> &'a ModelManager {
        self.manager
    }

    /// The declaring model file.
    #[must_use]
    pub const fn model_file(&self) -> &'a ModelFile {
        self.file
    }

    /// The declaration AST.
    #[must_use]
    pub const fn declaration(&self) -> &'a Declaration {
        self.declaration
    }

    /// Short name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.declaration.name()
    }

    /// Declaring namespace.
    #[must_use]
    pub fn namespace(&self) -> &'a str {
        self.file.namespace()
    }

    /// Fully-qualified name.
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        fully_qualified_name(self.namespace(), self.name())
    }

    /// Declaration kind.
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        self.declaration.kind()
    }

    /// Returns true for abstract classes.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.declaration.is_abstract()
    }

    /// Attached decorators.
    #[must_use]
    pub fn decorators(&self) -> &'a [Decorator] {
        self.declaration.decorators()
    }

    /// The class declaration, for class kinds.
    #[must_use]
    pub const fn as_class(&self) -> Option<&'a ClassDeclaration> {
        self.declaration.as_class()
    }

    /// The scalar declaration, for scalar kinds.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&'a ScalarDeclaration> {
        self.declaration.as_scalar()
    }

    /// Values of an enum declaration; empty for other kinds.
    #[must_use]
    pub fn enum_values(&self) -> &'a [EnumValue] {
        match self.declaration {
            Declaration::Enum(e) => &e.properties,
            _ => &[],
        }
    }

    fn illegal(&self, message: impl Into<String>) -> Error {
        self.file.illegal(message, self.declaration.location())
    }

    // =========================================================================
    // Inheritance
    // =========================================================================

    /// Fully-qualified name of the super type.
    ///
    /// Classes without an explicit super type extend the root type of their
    /// kind; the root types themselves have none.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if an explicit super type cannot be resolved.
    pub fn super_type_name(&self) -> Result<Option<String>> {
        let Some(class) = self.as_class() else {
            return Ok(None);
        };
        match &class.super_type {
            Some(type_ref) => self
                .file
                .resolve_type_identifier(type_ref)
                .map(Some)
                .ok_or_else(|| {
                    self.illegal(format!(
                        "could not resolve super type {} of {}",
                        type_ref.name,
                        self.fully_qualified_name()
                    ))
                }),
            None if self.file.is_root() => Ok(None),
            None => Ok(self
                .kind()
                .root_type()
                .map(|root| fully_qualified_name(ROOT_NAMESPACE, root))),
        }
    }

    /// The super type declaration.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` or `TypeNotFound` if it cannot be resolved.
    pub fn super_type(&self) -> Result<Option<Self>> {
        self.super_type_name()?
            .map(|name| self.manager.get_type(&name))
            .transpose()
    }

    /// Every ancestor, nearest first, ending at the root type.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` for circular inheritance or an unresolvable
    /// super type.
    pub fn super_types(&self) -> Result<Vec<Self>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([self.fully_qualified_name()]);
        let mut current = *self;
        while let Some(name) = current.super_type_name()? {
            if !seen.insert(name.clone()) {
                return Err(self.illegal(format!(
                    "circular inheritance: {} eventually extends itself through {name}",
                    self.fully_qualified_name()
                )));
            }
            let parent = self.manager.get_type(&name)?;
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }

    /// Returns true if this declaration is `fqn` or one of its subtypes.
    ///
    /// # Errors
    ///
    /// Propagates inheritance resolution failures.
    pub fn is_assignable_to(&self, fqn: &str) -> Result<bool> {
        if self.fully_qualified_name() == fqn {
            return Ok(true);
        }
        Ok(self
            .super_types()?
            .iter()
            .any(|d| d.fully_qualified_name() == fqn))
    }

    /// Declarations whose super type is this declaration.
    #[must_use]
    pub fn direct_subclasses(&self) -> Vec<Self> {
        let fqn = self.fully_qualified_name();
        self.manager
            .declarations()
            .filter(|d| d.super_type_name().ok().flatten().as_deref() == Some(fqn.as_str()))
            .collect()
    }

    /// This declaration if concrete, else the first concrete subclass found
    /// breadth-first.
    #[must_use]
    pub fn find_concrete_subclass(&self) -> Option<Self> {
        let mut queue = VecDeque::from([*self]);
        let mut seen = HashSet::new();
        while let Some(decl) = queue.pop_front() {
            if !seen.insert(decl.fully_qualified_name()) {
                continue;
            }
            if !decl.is_abstract() {
                return Some(decl);
            }
            queue.extend(decl.direct_subclasses());
        }
        None
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Properties declared on this class.
    #[must_use]
    pub fn own_properties(&self) -> Vec<PropertyRef<'a>> {
        self.as_class()
            .map(|c| {
                c.properties
                    .iter()
                    .map(|property| PropertyRef {
                        owner: *self,
                        property,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Own properties followed by inherited ones, nearest ancestor first.
    ///
    /// # Errors
    ///
    /// Propagates inheritance resolution failures.
    pub fn properties(&self) -> Result<Vec<PropertyRef<'a>>> {
        let mut properties = self.own_properties();
        for ancestor in self.super_types()? {
            properties.extend(ancestor.own_properties());
        }
        Ok(properties)
    }

    /// A property (own or inherited) by name.
    ///
    /// # Errors
    ///
    /// Propagates inheritance resolution failures.
    pub fn property(&self, name: &str) -> Result<Option<PropertyRef<'a>>> {
        Ok(self.properties()?.into_iter().find(|p| p.name() == name))
    }

    /// Walks a dotted path through nested class declarations.
    ///
    /// # Errors
    ///
    /// Returns `PropertyNotFound` naming the first missing segment, or
    /// `PrimitiveEncountered` if the path continues past a non-class type.
    pub fn nested_property(&self, path: &str) -> Result<PropertyRef<'a>> {
        if path.is_empty() {
            return Err(Error::invalid_argument("property path is empty"));
        }
        let segments: Vec<&str> = path.split('.').collect();
        let mut current = *self;
        for (i, segment) in segments.iter().enumerate() {
            let property = current.property(segment)?.ok_or_else(|| {
                Error::new(ErrorKind::PropertyNotFound {
                    class: current.fully_qualified_name(),
                    property: (*segment).to_string(),
                })
            })?;
            if i + 1 == segments.len() {
                return Ok(property);
            }
            match property.target()? {
                PropertyTarget::Class(decl) => current = decl,
                _ => {
                    return Err(Error::new(ErrorKind::PrimitiveEncountered {
                        path: path.to_string(),
                        segment: (*segment).to_string(),
                    }));
                }
            }
        }
        Err(Error::internal("property path walk ended without a result"))
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// The identifying field, searching this class then its ancestors.
    ///
    /// # Errors
    ///
    /// Propagates inheritance resolution failures.
    pub fn identifier(&self) -> Result<Option<IdentifierField>> {
        if self.as_class().is_none() {
            return Ok(None);
        }
        let chain = std::iter::once(*self).chain(self.super_types()?);
        for decl in chain {
            match decl.as_class().and_then(|c| c.identified.as_ref()) {
                Some(Identified::System) => return Ok(Some(IdentifierField::System)),
                Some(Identified::By { name }) => {
                    return Ok(Some(IdentifierField::Explicit(name.clone())));
                }
                None => {}
            }
        }
        Ok(None)
    }

    /// Name of the identifying field (`$identifier` when system-identified).
    ///
    /// # Errors
    ///
    /// Propagates inheritance resolution failures.
    pub fn identifier_field_name(&self) -> Result<Option<String>> {
        Ok(self.identifier()?.map(|id| id.field_name().to_string()))
    }

    /// Returns true if instances carry an identifier.
    ///
    /// # Errors
    ///
    /// Propagates inheritance resolution failures.
    pub fn is_identified(&self) -> Result<bool> {
        Ok(self.identifier()?.is_some())
    }

    /// Returns true if instances use the system identifier.
    ///
    /// # Errors
    ///
    /// Propagates inheritance resolution failures.
    pub fn is_system_identified(&self) -> Result<bool> {
        Ok(self.identifier()? == Some(IdentifierField::System))
    }

    // =========================================================================
    // Maps and scalars
    // =========================================================================

    fn target_of(
        &self,
        primitive: Option<Primitive>,
        type_ref: Option<&TypeIdentifier>,
        context: &str,
    ) -> Result<PropertyTarget<'a>> {
        if let Some(p) = primitive {
            return Ok(PropertyTarget::Primitive(p));
        }
        let Some(type_ref) = type_ref else {
            return Err(self.illegal(format!("{context} does not name a type")));
        };
        if type_ref.namespace.is_none() {
            if let Some(p) = Primitive::from_name(&type_ref.name) {
                return Ok(PropertyTarget::Primitive(p));
            }
        }
        let fqn = self.file.resolve_type_identifier(type_ref).ok_or_else(|| {
            self.illegal(format!("{context} refers to undeclared type {}", type_ref.name))
        })?;
        let decl = self.manager.get_type(&fqn).map_err(|e| {
            self.illegal(format!("{context} refers to unresolvable type {fqn}: {e}"))
        })?;
        Ok(PropertyTarget::of(decl))
    }

    /// Resolved key and value types of a map declaration.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if either type cannot be resolved.
    pub fn map_types(&self) -> Result<Option<MapTypes<'a>>> {
        let Declaration::Map(map) = self.declaration else {
            return Ok(None);
        };
        let fqn = self.fully_qualified_name();
        let key_primitive = match map.key {
            MapKeyType::String(_) => Some(Primitive::String),
            MapKeyType::DateTime(_) => Some(Primitive::DateTime),
            MapKeyType::Object(_) => None,
        };
        let key = self.target_of(
            key_primitive,
            map.key.element().type_ref.as_ref(),
            &format!("key of map {fqn}"),
        )?;
        let value = self.target_of(
            map.value.primitive(),
            map.value.element().type_ref.as_ref(),
            &format!("value of map {fqn}"),
        )?;
        Ok(Some(MapTypes {
            key,
            value,
            value_is_relationship: matches!(map.value, MapValueType::Relationship(_)),
        }))
    }

    /// The range validator of a numeric scalar, reported against `owner`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if the validator is malformed.
    pub fn scalar_number_validator(&self, owner: &str) -> Result<Option<NumberValidator>> {
        match self.as_scalar() {
            Some(ScalarDeclaration {
                validator: Some(v),
                default_value,
                ..
            }) => NumberValidator::from_ast(owner, v, default_value.as_ref()),
            _ => Ok(None),
        }
    }

    /// The string validator of a String scalar, reported against `owner`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if the validator is malformed.
    pub fn scalar_string_validator(&self, owner: &str) -> Result<Option<StringValidator>> {
        match self.as_scalar() {
            Some(s) => StringValidator::from_ast(
                owner,
                s.validator.as_ref(),
                s.length_validator.as_ref(),
                s.default_value.as_ref(),
            ),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Checks the declaration against the rest of the registry.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` for rule violations and
    /// `ClassMustHaveIdentifier` for unidentified concrete classes when the
    /// registry requires identifiers.
    pub fn validate(&self) -> Result<()> {
        match self.declaration {
            Declaration::Concept(c)
            | Declaration::Asset(c)
            | Declaration::Participant(c)
            | Declaration::Transaction(c)
            | Declaration::Event(c) => self.validate_class(c),
            Declaration::Enum(e) => self.validate_enum(e),
            Declaration::Map(m) => self.validate_map(m),
            Declaration::BooleanScalar(s)
            | Declaration::IntegerScalar(s)
            | Declaration::LongScalar(s)
            | Declaration::DoubleScalar(s)
            | Declaration::StringScalar(s)
            | Declaration::DateTimeScalar(s) => self.validate_scalar(s),
        }
    }

    fn validate_class(&self, class: &ClassDeclaration) -> Result<()> {
        let fqn = self.fully_qualified_name();

        if let Some(super_name) = self.super_type_name()? {
            let parent = self.manager.get_type(&super_name).map_err(|e| {
                self.illegal(format!("super type {super_name} of {fqn} is not declared: {e}"))
            })?;
            if parent.kind() != self.kind() {
                return Err(self.illegal(format!(
                    "{} {fqn} cannot extend {} {super_name}",
                    self.kind(),
                    parent.kind()
                )));
            }
        }
        let ancestors = self.super_types()?;
        let explicit_ancestor = ancestors.iter().find(|a| {
            matches!(
                a.as_class().and_then(|c| c.identified.as_ref()),
                Some(Identified::By { .. })
            )
        });

        match &class.identified {
            Some(Identified::By { name }) => {
                if let Some(ancestor) = explicit_ancestor {
                    return Err(self.illegal(format!(
                        "{fqn} cannot redeclare the identifier already declared by {}",
                        ancestor.fully_qualified_name()
                    )));
                }
                let property = self.property(name)?.ok_or_else(|| {
                    self.illegal(format!("identifying field {name} of {fqn} is not declared"))
                })?;
                if property.is_optional() || property.is_array() {
                    return Err(self.illegal(format!(
                        "identifying field {name} of {fqn} must be a single required value"
                    )));
                }
                if property.target()?.primitive() != Some(Primitive::String)
                    || property.is_relationship()
                {
                    return Err(self.illegal(format!(
                        "identifying field {name} of {fqn} must be a String"
                    )));
                }
            }
            Some(Identified::System) => {
                if let Some(ancestor) = explicit_ancestor {
                    return Err(self.illegal(format!(
                        "{fqn} cannot replace the identifier declared by {}",
                        ancestor.fully_qualified_name()
                    )));
                }
            }
            None => {}
        }

        if self.manager.options().require_identifiers
            && !class.is_abstract
            && self.identifier()?.is_none()
        {
            let mut context = ErrorContext::new().with_source(self.file.display_name());
            if let Some(range) = &class.location {
                context = context.with_position(range.start.line, range.start.column);
            }
            return Err(Error::new(ErrorKind::ClassMustHaveIdentifier { class: fqn }).with_context(context));
        }

        let mut names: HashSet<&str> = ancestors
            .iter()
            .flat_map(DeclarationRef::own_properties)
            .map(|p| p.name())
            .collect();
        for property in self.own_properties() {
            let name = property.name();
            if is_reserved_property(name) {
                return Err(self.illegal(format!("property name {name} of {fqn} is reserved")));
            }
            if !is_valid_identifier(name) {
                return Err(self.illegal(format!("invalid property name \"{name}\" in {fqn}")));
            }
            if !names.insert(name) {
                return Err(self.illegal(format!(
                    "property {name} of {fqn} is declared more than once in its inheritance chain"
                )));
            }
            property.validate()?;
        }
        Ok(())
    }

    fn validate_enum(&self, decl: &EnumDeclaration) -> Result<()> {
        let mut seen = HashSet::new();
        for value in &decl.properties {
            if !is_valid_identifier(&value.name) {
                return Err(self.illegal(format!(
                    "invalid enum value \"{}\" in {}",
                    value.name,
                    self.fully_qualified_name()
                )));
            }
            if !seen.insert(value.name.as_str()) {
                return Err(self.illegal(format!(
                    "enum {} declares value {} more than once",
                    self.fully_qualified_name(),
                    value.name
                )));
            }
        }
        Ok(())
    }

    fn validate_map(&self, map: &MapDeclaration) -> Result<()> {
        let fqn = self.fully_qualified_name();
        let invalid = |what: &str, detail: String| {
            self.illegal(format!("map {fqn} has an invalid {what}: {detail}"))
        };
        let types = self
            .map_types()
            .map_err(|e| invalid("type", e.to_string()))?
            .ok_or_else(|| Error::internal("map declaration without map types"))?;

        match types.key {
            PropertyTarget::Primitive(Primitive::String | Primitive::DateTime)
            | PropertyTarget::Scalar(_, Primitive::String | Primitive::DateTime) => {}
            other => {
                return Err(invalid(
                    "key type",
                    format!("{} is not String, DateTime or a scalar of either", describe(&other)),
                ));
            }
        }

        match (&map.value, types.value) {
            (MapValueType::Relationship(_), PropertyTarget::Class(decl)) => {
                if !decl.is_identified()? {
                    return Err(invalid(
                        "value type",
                        format!("relationship target {} is not identified", decl.fully_qualified_name()),
                    ));
                }
            }
            (MapValueType::Relationship(_), other) => {
                return Err(invalid(
                    "value type",
                    format!("relationship to {} is not permitted", describe(&other)),
                ));
            }
            (_, PropertyTarget::Primitive(_) | PropertyTarget::Scalar(..)) => {}
            (_, PropertyTarget::Class(decl)) if decl.kind() == DeclarationKind::Concept => {}
            (_, other) => {
                return Err(invalid(
                    "value type",
                    format!("{} is not a primitive, scalar or concept", describe(&other)),
                ));
            }
        }
        Ok(())
    }

    fn validate_scalar(&self, scalar: &ScalarDeclaration) -> Result<()> {
        let fqn = self.fully_qualified_name();
        let DeclarationKind::Scalar(primitive) = self.kind() else {
            return Ok(());
        };
        if let Some(default) = &scalar.default_value {
            if !literal_matches(primitive, default) {
                return Err(self.illegal(format!(
                    "default value {default} of scalar {fqn} is not a {primitive}"
                )));
            }
        }
        check_validator_kinds(
            primitive,
            scalar.validator.as_ref(),
            scalar.length_validator.is_some(),
        )
        .map_err(|message| self.illegal(format!("scalar {fqn}: {message}")))?;
        self.scalar_number_validator(&fqn)?;
        self.scalar_string_validator(&fqn)?;
        Ok(())
    }
}

fn describe(target: &PropertyTarget<'_>) -> String {
    match target {
        PropertyTarget::Primitive(p) => p.to_string(),
        PropertyTarget::Scalar(d, _)
        | PropertyTarget::Enum(d)
        | PropertyTarget::Class(d)
        | PropertyTarget::Map(d) => format!("{} {}", d.kind(), d.fully_qualified_name()),
    }
}

fn literal_matches(primitive: Primitive, literal: &Literal) -> bool {
    matches!(
        (primitive, literal),
        (Primitive::Boolean, Literal::Boolean(_))
            | (Primitive::String | Primitive::DateTime, Literal::String(_))
            | (Primitive::Integer | Primitive::Long | Primitive::Double, Literal::Integer(_))
            | (Primitive::Double, Literal::Double(_))
    )
}

fn check_validator_kinds(
    primitive: Primitive,
    validator: Option<&FieldValidator>,
    has_length: bool,
) -> std::result::Result<(), String> {
    if let Some(validator) = validator {
        let fits = matches!(
            (validator, primitive),
            (FieldValidator::StringRegex(_), Primitive::String)
                | (FieldValidator::IntegerDomain(_), Primitive::Integer)
                | (FieldValidator::LongDomain(_), Primitive::Long)
                | (FieldValidator::DoubleDomain(_), Primitive::Double)
        );
        if !fits {
            return Err(format!("validator does not apply to {primitive}"));
        }
    }
    if has_length && primitive != Primitive::String {
        return Err(format!("length validator does not apply to {primitive}"));
    }
    Ok(())
}

// =============================================================================
// PropertyRef
// =============================================================================

/// A property together with the class that declares it.
#[derive(Clone, Copy, Debug)]
pub struct PropertyRef<'a> {
    owner: DeclarationRef<'a>,
    property: &'a Property,
}

impl<'a> PropertyRef<'a> {
    /// The declaring class.
    #[must_use]
    pub const fn owner(&self) -> DeclarationRef<'a> {
        self.owner
    }

    /// The property AST.
    #[must_use]
    pub const fn property(&self) -> &'a Property {
        self.property
    }

    /// The shared field data.
    #[must_use]
    pub const fn field(&self) -> &'a Field {
        self.property.field()
    }

    /// Property name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.property.name()
    }

    /// `<declaring class fqn>.<name>`
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        format!("{}.{}", self.owner.fully_qualified_name(), self.name())
    }

    /// Returns true for optional properties.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.property.is_optional()
    }

    /// Returns true for array properties.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.property.is_array()
    }

    /// Returns true for relationships.
    #[must_use]
    pub const fn is_relationship(&self) -> bool {
        self.property.is_relationship()
    }

    /// The property type after name resolution.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if the type name cannot be resolved.
    pub fn resolved_type(&self) -> Result<ResolvedType> {
        match self.target()? {
            PropertyTarget::Primitive(p) => Ok(ResolvedType::Primitive(p)),
            PropertyTarget::Scalar(d, _)
            | PropertyTarget::Enum(d)
            | PropertyTarget::Class(d)
            | PropertyTarget::Map(d) => Ok(ResolvedType::Declared(d.fully_qualified_name())),
        }
    }

    /// What the property holds.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if the type cannot be resolved.
    pub fn target(&self) -> Result<PropertyTarget<'a>> {
        self.owner.target_of(
            self.property.primitive(),
            self.field().type_ref.as_ref(),
            &format!("property {}", self.fully_qualified_name()),
        )
    }

    /// The default value, falling back to a scalar type's default.
    ///
    /// # Errors
    ///
    /// Propagates type resolution failures.
    pub fn default_value(&self) -> Result<Option<&'a Literal>> {
        if let Some(default) = &self.field().default_value {
            return Ok(Some(default));
        }
        Ok(match self.target()? {
            PropertyTarget::Scalar(d, _) => d.as_scalar().and_then(|s| s.default_value.as_ref()),
            _ => None,
        })
    }

    /// The range validator, falling back to a scalar type's validator.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if the validator is malformed.
    pub fn number_validator(&self) -> Result<Option<NumberValidator>> {
        let owner = self.fully_qualified_name();
        if let Some(v) = &self.field().validator {
            return NumberValidator::from_ast(owner, v, self.field().default_value.as_ref());
        }
        match self.target()? {
            PropertyTarget::Scalar(d, _) => d.scalar_number_validator(&owner),
            _ => Ok(None),
        }
    }

    /// The string validator, falling back to a scalar type's validator.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` if the validator is malformed.
    pub fn string_validator(&self) -> Result<Option<StringValidator>> {
        let owner = self.fully_qualified_name();
        let field = self.field();
        if field.validator.is_some() || field.length_validator.is_some() {
            return StringValidator::from_ast(
                owner,
                field.validator.as_ref(),
                field.length_validator.as_ref(),
                field.default_value.as_ref(),
            );
        }
        match self.target()? {
            PropertyTarget::Scalar(d, _) => d.scalar_string_validator(&owner),
            _ => Ok(None),
        }
    }

    fn validate(&self) -> Result<()> {
        let fqn = self.fully_qualified_name();
        let illegal = |message: String| self.owner.illegal(message);
        let target = self.target()?;

        if self.is_relationship() {
            match target {
                PropertyTarget::Class(decl) => {
                    if !decl.is_identified()? {
                        return Err(illegal(format!(
                            "relationship {fqn} must refer to an identified type, not {}",
                            decl.fully_qualified_name()
                        )));
                    }
                }
                other => {
                    return Err(illegal(format!(
                        "relationship {fqn} cannot refer to {}",
                        describe(&other)
                    )));
                }
            }
        }

        let field = self.field();
        match target.primitive() {
            Some(primitive) => {
                check_validator_kinds(
                    primitive,
                    field.validator.as_ref(),
                    field.length_validator.is_some(),
                )
                .map_err(|message| illegal(format!("property {fqn}: {message}")))?;
            }
            None if field.validator.is_some() || field.length_validator.is_some() => {
                return Err(illegal(format!(
                    "property {fqn}: validators apply only to primitive types"
                )));
            }
            None => {}
        }

        if let Some(default) = &field.default_value {
            let valid = match target {
                PropertyTarget::Primitive(p) | PropertyTarget::Scalar(_, p) => {
                    literal_matches(p, default)
                }
                PropertyTarget::Enum(decl) => matches!(
                    default,
                    Literal::String(s) if decl.enum_values().iter().any(|v| &v.name == s)
                ),
                PropertyTarget::Class(_) | PropertyTarget::Map(_) => false,
            };
            if !valid {
                return Err(illegal(format!(
                    "default value {default} is not valid for property {fqn} of type {}",
                    describe(&target)
                )));
            }
        }

        self.number_validator()?;
        self.string_validator()?;
        Ok(())
    }
}
