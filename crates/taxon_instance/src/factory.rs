//! Construction of new resources.

use std::collections::HashSet;

use chrono::{Duration, Offset, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use taxon_foundation::{Error, ErrorKind, Primitive, Result};
use taxon_model::ast::Literal;
use taxon_model::{
    DeclarationKind, DeclarationRef, IdentifierField, ModelManager, PropertyRef, PropertyTarget,
};
use tracing::debug;

use crate::datetime::{now, parse_date_time};
use crate::value::{MapInstance, Relationship, Resource, Value};

/// How fields without a default are filled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerateMode {
    /// Zero values: empty strings, zeros, `false`, the first enum value.
    Empty,
    /// Plausible random values, deterministic for a given seed.
    Sample,
}

/// Options for [`Factory`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FactoryOptions {
    /// Fill in fields that have no default.
    pub generate: Option<GenerateMode>,
    /// Also fill in optional fields.
    pub include_optional_fields: bool,
    /// Seed for sample values.
    pub seed: u64,
}

impl FactoryOptions {
    /// Sets the generation mode.
    #[must_use]
    pub const fn with_generate(mut self, mode: GenerateMode) -> Self {
        self.generate = Some(mode);
        self
    }

    /// Sets whether optional fields are generated.
    #[must_use]
    pub const fn with_optional_fields(mut self, include: bool) -> Self {
        self.include_optional_fields = include;
        self
    }

    /// Sets the sample seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Creates resources and relationships for declared types.
#[derive(Clone, Copy, Debug)]
pub struct Factory<'m> {
    manager: &'m ModelManager,
}

impl<'m> Factory<'m> {
    /// Creates a factory over a registry.
    #[must_use]
    pub const fn new(manager: &'m ModelManager) -> Self {
        Self { manager }
    }

    /// Creates an instance of a class.
    ///
    /// Declared default values are always applied; other fields are filled
    /// in according to `options.generate`.
    ///
    /// # Errors
    ///
    /// Returns `AbstractInstantiation` for abstract classes, `NotIdentifiable`
    /// when an identifier is given for an unidentified class, and
    /// `MissingIdentifier` when an identified class gets a blank or absent
    /// identifier.
    pub fn new_resource(
        &self,
        fqn: &str,
        identifier: Option<&str>,
        options: &FactoryOptions,
    ) -> Result<Resource> {
        let decl = self.class(fqn)?;
        let mut resource = Resource::new(decl.fully_qualified_name());

        match (decl.identifier()?, identifier) {
            (None, Some(_)) => {
                return Err(Error::new(ErrorKind::NotIdentifiable {
                    class: decl.fully_qualified_name(),
                }));
            }
            (Some(_), None) => {
                return Err(Error::new(ErrorKind::MissingIdentifier {
                    class: decl.fully_qualified_name(),
                }));
            }
            (Some(_), Some(id)) if id.trim().is_empty() => {
                return Err(Error::new(ErrorKind::MissingIdentifier {
                    class: decl.fully_qualified_name(),
                }));
            }
            (Some(field), Some(id)) => {
                resource.set_identifier(id);
                if let IdentifierField::Explicit(name) = field {
                    resource.set(name, id);
                }
            }
            (None, None) => {}
        }

        let mut generator = Generator::new(options);
        generator.visiting.insert(decl.fully_qualified_name());
        generator.fill(&mut resource, decl)?;

        if matches!(decl.kind(), DeclarationKind::Transaction | DeclarationKind::Event) {
            resource.set_timestamp(now());
        }
        debug!(class = fqn, generate = ?options.generate, "resource created");
        Ok(resource)
    }

    /// Creates an instance of an unidentified class (typically a concept).
    ///
    /// # Errors
    ///
    /// As [`Factory::new_resource`] with no identifier.
    pub fn new_concept(&self, fqn: &str, options: &FactoryOptions) -> Result<Resource> {
        self.new_resource(fqn, None, options)
    }

    /// Creates a transaction stamped with the current time.
    ///
    /// # Errors
    ///
    /// As [`Factory::new_resource`], plus `TypeMismatch` if `fqn` is not a
    /// transaction.
    pub fn new_transaction(
        &self,
        fqn: &str,
        identifier: Option<&str>,
        options: &FactoryOptions,
    ) -> Result<Resource> {
        self.expect_kind(fqn, DeclarationKind::Transaction)?;
        self.new_resource(fqn, identifier, options)
    }

    /// Creates an event stamped with the current time.
    ///
    /// # Errors
    ///
    /// As [`Factory::new_resource`], plus `TypeMismatch` if `fqn` is not an
    /// event.
    pub fn new_event(
        &self,
        fqn: &str,
        identifier: Option<&str>,
        options: &FactoryOptions,
    ) -> Result<Resource> {
        self.expect_kind(fqn, DeclarationKind::Event)?;
        self.new_resource(fqn, identifier, options)
    }

    /// Creates a relationship to an instance of an identified class.
    ///
    /// # Errors
    ///
    /// Returns `NotIdentifiable` for unidentified classes and
    /// `MissingIdentifier` for a blank identifier.
    pub fn new_relationship(&self, fqn: &str, identifier: &str) -> Result<Relationship> {
        let decl = self.manager.get_type(fqn)?;
        if !decl.is_identified()? {
            return Err(Error::new(ErrorKind::NotIdentifiable {
                class: decl.fully_qualified_name(),
            }));
        }
        if identifier.trim().is_empty() {
            return Err(Error::new(ErrorKind::MissingIdentifier {
                class: decl.fully_qualified_name(),
            }));
        }
        Ok(Relationship::new(decl.fully_qualified_name(), identifier))
    }

    fn class(&self, fqn: &str) -> Result<DeclarationRef<'m>> {
        let decl = self.manager.get_type(fqn)?;
        if !decl.kind().is_class() {
            return Err(Error::type_mismatch(
                "$class",
                "a class declaration",
                format!("{} {fqn}", decl.kind()),
            ));
        }
        if decl.is_abstract() {
            return Err(Error::new(ErrorKind::AbstractInstantiation {
                class: decl.fully_qualified_name(),
            }));
        }
        Ok(decl)
    }

    fn expect_kind(&self, fqn: &str, kind: DeclarationKind) -> Result<()> {
        let decl = self.manager.get_type(fqn)?;
        if decl.kind() == kind {
            Ok(())
        } else {
            Err(Error::type_mismatch(
                "$class",
                kind.to_string(),
                decl.kind().to_string(),
            ))
        }
    }
}

/// Converts a declared default into a value of the given primitive type.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn literal_value(literal: &Literal, primitive: Option<Primitive>) -> Result<Value> {
    Ok(match (literal, primitive) {
        (Literal::String(s), Some(Primitive::DateTime)) => {
            Value::DateTime(parse_date_time(s, false, Utc.fix())?)
        }
        (Literal::Integer(i), Some(Primitive::Double)) => Value::from(*i as f64),
        (Literal::Boolean(b), _) => Value::Boolean(*b),
        (Literal::Integer(i), _) => Value::Integer(*i),
        (Literal::Double(d), _) => Value::Double(*d),
        (Literal::String(s), _) => Value::String(s.clone()),
    })
}

const WORDS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
];

struct Generator<'o> {
    options: &'o FactoryOptions,
    rng: ChaCha8Rng,
    visiting: HashSet<String>,
}

impl<'o> Generator<'o> {
    fn new(options: &'o FactoryOptions) -> Self {
        Self {
            options,
            rng: ChaCha8Rng::seed_from_u64(options.seed),
            visiting: HashSet::new(),
        }
    }

    fn fill(&mut self, resource: &mut Resource, decl: DeclarationRef<'_>) -> Result<()> {
        for property in decl.properties()? {
            if resource.contains(property.name()) {
                continue;
            }
            if let Some(value) = self.property_value(&property)? {
                resource.set(property.name(), value);
            }
        }
        Ok(())
    }

    fn property_value(&mut self, property: &PropertyRef<'_>) -> Result<Option<Value>> {
        let target = property.target()?;
        if let Some(literal) = property.default_value()? {
            let value = literal_value(literal, target.primitive())?;
            return Ok(Some(if property.is_array() {
                Value::Array(vec![value])
            } else {
                value
            }));
        }
        let Some(mode) = self.options.generate else {
            return Ok(None);
        };
        if property.is_optional() && !self.options.include_optional_fields {
            return Ok(None);
        }
        if property.is_array() {
            return Ok(Some(match mode {
                GenerateMode::Empty => Value::Array(Vec::new()),
                GenerateMode::Sample => {
                    let item = self.target_value(property, target, mode)?;
                    Value::Array(item.into_iter().collect())
                }
            }));
        }
        self.target_value(property, target, mode)
    }

    fn target_value(
        &mut self,
        property: &PropertyRef<'_>,
        target: PropertyTarget<'_>,
        mode: GenerateMode,
    ) -> Result<Option<Value>> {
        if property.is_relationship() {
            let Some(decl) = target.declaration() else {
                return Ok(None);
            };
            let class = decl
                .find_concrete_subclass()
                .unwrap_or(decl)
                .fully_qualified_name();
            let id = self.word(mode);
            return Ok(Some(Value::Relationship(Relationship::new(class, id))));
        }
        match target {
            PropertyTarget::Primitive(p) | PropertyTarget::Scalar(_, p) => {
                self.primitive_value(property, p, mode).map(Some)
            }
            PropertyTarget::Enum(decl) => {
                let values = decl.enum_values();
                let index = match mode {
                    GenerateMode::Empty => 0,
                    GenerateMode::Sample if values.is_empty() => 0,
                    GenerateMode::Sample => self.rng.gen_range(0..values.len()),
                };
                Ok(values.get(index).map(|v| Value::String(v.name.clone())))
            }
            PropertyTarget::Class(decl) => self.nested(decl, mode),
            PropertyTarget::Map(decl) => Ok(Some(Value::Map(MapInstance::new(
                decl.fully_qualified_name(),
            )))),
        }
    }

    fn nested(&mut self, decl: DeclarationRef<'_>, mode: GenerateMode) -> Result<Option<Value>> {
        let concrete = if decl.is_abstract() {
            match decl.find_concrete_subclass() {
                Some(concrete) => concrete,
                None => return Ok(None),
            }
        } else {
            decl
        };
        let fqn = concrete.fully_qualified_name();
        if !self.visiting.insert(fqn.clone()) {
            return Ok(None);
        }
        let mut resource = Resource::new(fqn.clone());
        if let Some(field) = concrete.identifier()? {
            let id = self.word(mode);
            if let IdentifierField::Explicit(name) = &field {
                resource.set(name, id.as_str());
            }
            resource.set_identifier(id);
        }
        self.fill(&mut resource, concrete)?;
        self.visiting.remove(&fqn);
        Ok(Some(Value::Resource(resource)))
    }

    fn word(&mut self, mode: GenerateMode) -> String {
        match mode {
            GenerateMode::Empty => String::new(),
            GenerateMode::Sample => {
                let word = WORDS[self.rng.gen_range(0..WORDS.len())];
                format!("{word}{}", self.rng.gen_range(0..1000))
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn primitive_value(
        &mut self,
        property: &PropertyRef<'_>,
        primitive: Primitive,
        mode: GenerateMode,
    ) -> Result<Value> {
        let bounds = property.number_validator()?;
        let (lower, upper) = bounds.as_ref().map_or((None, None), |v| {
            (v.lower().map(|n| n.as_f64()), v.upper().map(|n| n.as_f64()))
        });
        Ok(match (mode, primitive) {
            (_, Primitive::Boolean) if mode == GenerateMode::Empty => Value::Boolean(false),
            (_, Primitive::Boolean) => Value::Boolean(self.rng.gen_bool(0.5)),
            (GenerateMode::Empty, Primitive::String) => Value::String(String::new()),
            (GenerateMode::Sample, Primitive::String) => Value::String(self.word(mode)),
            (_, Primitive::DateTime) if mode == GenerateMode::Empty => Value::DateTime(now()),
            (_, Primitive::DateTime) => {
                let days = self.rng.gen_range(0..3650);
                Value::DateTime(now() - Duration::days(days))
            }
            (_, Primitive::Integer | Primitive::Long) => {
                let lo = lower.map_or(0, |l| l.ceil() as i64);
                let hi = upper.map_or(lo.saturating_add(100), |u| u.floor() as i64).max(lo);
                Value::Integer(match mode {
                    GenerateMode::Empty => lo.max(0).min(hi),
                    GenerateMode::Sample => self.rng.gen_range(lo..=hi),
                })
            }
            (_, Primitive::Double) => {
                let lo = lower.unwrap_or(0.0);
                let hi = upper.unwrap_or(lo + 100.0).max(lo);
                Value::Double(match mode {
                    GenerateMode::Empty => lo.max(0.0).min(hi),
                    GenerateMode::Sample => self.rng.gen_range(lo..=hi),
                })
            }
        })
    }
}
