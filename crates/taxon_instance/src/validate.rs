//! Instance validation against declared types.
//!
//! The walk keeps an explicit work stack instead of recursing, so deeply
//! nested instances are checked without growing the call stack. The first
//! violation ends the walk.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::{Offset, Utc};
use taxon_foundation::{
    Error, ErrorKind, IDENTIFIER_PROPERTY, Primitive, Result, is_reserved_property,
};
use taxon_model::{
    DeclarationRef, IdentifierField, ModelManager, Number, NumberValidator, PropertyRef,
    PropertyTarget, StringValidator,
};
use tracing::debug;

use crate::datetime::parse_date_time;
use crate::value::{MapInstance, Resource, Value};

#[derive(Debug, Default)]
struct Checks {
    number: Option<NumberValidator>,
    string: Option<StringValidator>,
}

/// Where a value sits in the instance tree.
#[derive(Clone, Debug)]
struct Slot<'m> {
    class: Rc<str>,
    field: String,
    identifier: Rc<str>,
    target: PropertyTarget<'m>,
    relationship: bool,
    checks: Rc<Checks>,
}

enum Task<'v, 'm> {
    Resource {
        resource: &'v Resource,
        expected: Option<DeclarationRef<'m>>,
        path: String,
    },
    Value {
        value: &'v Value,
        slot: Slot<'m>,
        path: String,
    },
}

/// Checks resources against their declared types.
#[derive(Clone, Copy, Debug)]
pub struct InstanceValidator<'m> {
    manager: &'m ModelManager,
    permit_resources_for_relationships: bool,
}

impl<'m> InstanceValidator<'m> {
    /// Creates a validator over a registry.
    #[must_use]
    pub const fn new(manager: &'m ModelManager) -> Self {
        Self {
            manager,
            permit_resources_for_relationships: false,
        }
    }

    /// Allows full resources where relationships are declared.
    #[must_use]
    pub const fn permit_resources_for_relationships(mut self, permit: bool) -> Self {
        self.permit_resources_for_relationships = permit;
        self
    }

    /// Validates a resource against its own `$class`.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self, resource: &Resource) -> Result<()> {
        self.run(resource, None)
    }

    /// Validates a resource that must be an instance of `fqn` or a subtype.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the resource's class is not assignable to
    /// `fqn`, or the first violation found.
    pub fn validate_as(&self, resource: &Resource, fqn: &str) -> Result<()> {
        let expected = self.manager.get_type(fqn)?;
        self.run(resource, Some(expected))
    }

    fn run(&self, resource: &Resource, expected: Option<DeclarationRef<'m>>) -> Result<()> {
        let mut walk = Walk {
            manager: self.manager,
            permit_resources: self.permit_resources_for_relationships,
            stack: vec![Task::Resource {
                resource,
                expected,
                path: resource.class_name().to_string(),
            }],
            checks: HashMap::new(),
        };
        walk.run().inspect_err(|e| {
            debug!(class = resource.class_name(), error = %e, "instance rejected");
        })
    }
}

/// Validates a resource against its own `$class`.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_resource(manager: &ModelManager, resource: &Resource) -> Result<()> {
    InstanceValidator::new(manager).validate(resource)
}

fn instance_label(resource: &Resource, field: Option<&IdentifierField>, class: &str) -> String {
    resource
        .identifier()
        .or_else(|| match field {
            Some(IdentifierField::Explicit(name)) => resource.get(name).and_then(Value::as_str),
            _ => None,
        })
        .map_or_else(|| class.to_string(), str::to_string)
}

struct Walk<'v, 'm> {
    manager: &'m ModelManager,
    permit_resources: bool,
    stack: Vec<Task<'v, 'm>>,
    checks: HashMap<String, Rc<Checks>>,
}

impl<'v, 'm> Walk<'v, 'm> {
    fn run(&mut self) -> Result<()> {
        while let Some(task) = self.stack.pop() {
            match task {
                Task::Resource {
                    resource,
                    expected,
                    path,
                } => self.visit_resource(resource, expected, &path)?,
                Task::Value { value, slot, path } => self.visit_value(value, &slot, path)?,
            }
        }
        Ok(())
    }

    fn property_checks(&mut self, property: &PropertyRef<'m>) -> Result<Rc<Checks>> {
        let key = property.fully_qualified_name();
        if let Some(checks) = self.checks.get(&key) {
            return Ok(Rc::clone(checks));
        }
        let checks = Rc::new(Checks {
            number: property.number_validator()?,
            string: property.string_validator()?,
        });
        self.checks.insert(key, Rc::clone(&checks));
        Ok(checks)
    }

    fn scalar_checks(&mut self, target: PropertyTarget<'m>) -> Result<Rc<Checks>> {
        let PropertyTarget::Scalar(decl, _) = target else {
            return Ok(Rc::default());
        };
        let key = decl.fully_qualified_name();
        if let Some(checks) = self.checks.get(&key) {
            return Ok(Rc::clone(checks));
        }
        let checks = Rc::new(Checks {
            number: decl.scalar_number_validator(&key)?,
            string: decl.scalar_string_validator(&key)?,
        });
        self.checks.insert(key, Rc::clone(&checks));
        Ok(checks)
    }

    fn visit_resource(
        &mut self,
        resource: &'v Resource,
        expected: Option<DeclarationRef<'m>>,
        path: &str,
    ) -> Result<()> {
        let decl = self.manager.get_type(resource.class_name())?;
        let class = decl.fully_qualified_name();
        if !decl.kind().is_class() {
            return Err(Error::type_mismatch(
                path,
                "a class instance",
                format!("{} {class}", decl.kind()),
            ));
        }
        if let Some(expected) = expected {
            let expected = expected.fully_qualified_name();
            if !decl.is_assignable_to(&expected)? {
                return Err(Error::type_mismatch(path, expected, class));
            }
        }
        if decl.is_abstract() {
            return Err(Error::new(ErrorKind::AbstractInstantiation { class }));
        }

        let properties = decl.properties()?;
        let identifier_field = decl.identifier()?;
        let identifier = instance_label(resource, identifier_field.as_ref(), &class);

        if let Some((key, _)) = resource.properties().find(|(key, _)| {
            !is_reserved_property(key) && !properties.iter().any(|p| p.name() == key.as_str())
        }) {
            return Err(Error::new(ErrorKind::UndeclaredProperty {
                class,
                property: key.clone(),
                identifier,
            }));
        }

        match &identifier_field {
            Some(IdentifierField::Explicit(field)) => {
                if let Some(Value::String(id)) = resource.get(field) {
                    if id.trim().is_empty() {
                        return Err(Error::new(ErrorKind::EmptyIdentifier {
                            class,
                            field: field.clone(),
                        }));
                    }
                }
            }
            Some(IdentifierField::System) => match resource.identifier() {
                Some(id) if id.trim().is_empty() => {
                    return Err(Error::new(ErrorKind::EmptyIdentifier {
                        class,
                        field: IDENTIFIER_PROPERTY.to_string(),
                    }));
                }
                None => {
                    return Err(Error::new(ErrorKind::MissingRequiredField {
                        class,
                        field: IDENTIFIER_PROPERTY.to_string(),
                        identifier,
                    }));
                }
                Some(_) => {}
            },
            None => {}
        }

        if let Some(missing) = properties
            .iter()
            .find(|p| !p.is_optional() && resource.get(p.name()).is_none())
        {
            return Err(Error::new(ErrorKind::MissingRequiredField {
                class,
                field: missing.name().to_string(),
                identifier,
            }));
        }

        let class: Rc<str> = class.into();
        let identifier: Rc<str> = identifier.into();
        for property in properties.iter().rev() {
            let Some(value) = resource.get(property.name()) else {
                continue;
            };
            let slot = Slot {
                class: Rc::clone(&class),
                field: property.name().to_string(),
                identifier: Rc::clone(&identifier),
                target: property.target()?,
                relationship: property.is_relationship(),
                checks: self.property_checks(property)?,
            };
            let field_path = format!("{path}.{}", property.name());
            let type_name = property.property().type_name();
            match (property.is_array(), value) {
                (true, Value::Array(items)) => {
                    for (i, item) in items.iter().enumerate().rev() {
                        self.stack.push(Task::Value {
                            value: item,
                            slot: slot.clone(),
                            path: format!("{field_path}[{i}]"),
                        });
                    }
                }
                (true, other) => {
                    return Err(Error::type_mismatch(
                        field_path,
                        format!("{type_name}[]"),
                        other.kind_name(),
                    ));
                }
                (false, Value::Array(_)) => {
                    return Err(Error::type_mismatch(field_path, type_name, "array"));
                }
                (false, value) => self.stack.push(Task::Value {
                    value,
                    slot,
                    path: field_path,
                }),
            }
        }
        Ok(())
    }

    fn visit_value(&mut self, value: &'v Value, slot: &Slot<'m>, path: String) -> Result<()> {
        if slot.relationship {
            return self.visit_relationship(value, slot, path);
        }
        match slot.target {
            PropertyTarget::Primitive(p) | PropertyTarget::Scalar(_, p) => {
                check_primitive(value, p, slot, &path)
            }
            PropertyTarget::Enum(decl) => match value {
                Value::String(s) if decl.enum_values().iter().any(|v| v.name == *s) => Ok(()),
                Value::String(s) => Err(Error::new(ErrorKind::InvalidEnumValue {
                    class: slot.class.to_string(),
                    field: slot.field.clone(),
                    value: s.clone(),
                    enumeration: decl.fully_qualified_name(),
                })),
                other => Err(Error::type_mismatch(
                    path,
                    decl.fully_qualified_name(),
                    other.kind_name(),
                )),
            },
            PropertyTarget::Class(decl) => match value {
                Value::Resource(resource) => {
                    self.stack.push(Task::Resource {
                        resource,
                        expected: Some(decl),
                        path,
                    });
                    Ok(())
                }
                other => Err(Error::type_mismatch(
                    path,
                    decl.fully_qualified_name(),
                    other.kind_name(),
                )),
            },
            PropertyTarget::Map(decl) => match value {
                Value::Map(map) => self.visit_map(map, decl, slot, &path),
                other => Err(Error::type_mismatch(
                    path,
                    decl.fully_qualified_name(),
                    other.kind_name(),
                )),
            },
        }
    }

    fn visit_relationship(&mut self, value: &'v Value, slot: &Slot<'m>, path: String) -> Result<()> {
        let Some(target) = slot.target.declaration() else {
            return Err(Error::internal("relationship without a declared target"));
        };
        let target_fqn = target.fully_qualified_name();
        match value {
            Value::Relationship(rel) => {
                let actual = self.manager.get_type(rel.class_name())?;
                if actual.is_assignable_to(&target_fqn)? {
                    Ok(())
                } else {
                    Err(Error::type_mismatch(path, target_fqn, rel.class_name()))
                }
            }
            Value::Resource(resource) if self.permit_resources => {
                self.stack.push(Task::Resource {
                    resource,
                    expected: Some(target),
                    path,
                });
                Ok(())
            }
            other => Err(Error::type_mismatch(
                path,
                format!("relationship to {target_fqn}"),
                other.kind_name(),
            )),
        }
    }

    fn visit_map(
        &mut self,
        map: &'v MapInstance,
        decl: DeclarationRef<'m>,
        slot: &Slot<'m>,
        path: &str,
    ) -> Result<()> {
        let fqn = decl.fully_qualified_name();
        if map.class_name() != fqn {
            return Err(Error::type_mismatch(path, fqn, map.class_name()));
        }
        let types = decl
            .map_types()?
            .ok_or_else(|| Error::internal("map declaration without map types"))?;
        let key_checks = self.scalar_checks(types.key)?;
        let value_checks = self.scalar_checks(types.value)?;
        let class: Rc<str> = fqn.into();

        for (key, value) in map.entries().iter().rev() {
            if types.key.primitive() == Some(Primitive::DateTime) {
                parse_date_time(key, false, Utc.fix())?;
            } else if let Some(validator) = &key_checks.string {
                validator.validate(&slot.identifier, Some(key))?;
            }
            self.stack.push(Task::Value {
                value,
                slot: Slot {
                    class: Rc::clone(&class),
                    field: key.clone(),
                    identifier: Rc::clone(&slot.identifier),
                    target: types.value,
                    relationship: types.value_is_relationship,
                    checks: Rc::clone(&value_checks),
                },
                path: format!("{path}[{key}]"),
            });
        }
        Ok(())
    }
}

fn check_number(slot: &Slot<'_>, number: Number) -> Result<()> {
    match &slot.checks.number {
        Some(validator) => validator.validate(&slot.identifier, Some(number)),
        None => Ok(()),
    }
}

#[allow(clippy::float_cmp)]
fn check_primitive(value: &Value, primitive: Primitive, slot: &Slot<'_>, path: &str) -> Result<()> {
    match (primitive, value) {
        (Primitive::Boolean, Value::Boolean(_)) | (Primitive::DateTime, Value::DateTime(_)) => {
            Ok(())
        }
        (Primitive::String, Value::String(s)) => match &slot.checks.string {
            Some(validator) => validator.validate(&slot.identifier, Some(s)),
            None => Ok(()),
        },
        (Primitive::Integer | Primitive::Long | Primitive::Double, Value::Double(d))
            if !d.is_finite() =>
        {
            Err(Error::new(ErrorKind::NonFiniteNumber {
                class: slot.class.to_string(),
                field: slot.field.clone(),
                value: *d,
            }))
        }
        (Primitive::Integer | Primitive::Long | Primitive::Double, Value::Integer(i)) => {
            check_number(slot, Number::Integer(*i))
        }
        (Primitive::Integer | Primitive::Long, Value::Double(d)) if d.fract() == 0.0 => {
            check_number(slot, Number::Double(*d))
        }
        (Primitive::Double, Value::Double(d)) => check_number(slot, Number::Double(*d)),
        (_, other) => Err(Error::type_mismatch(path, primitive.name(), other.kind_name())),
    }
}
