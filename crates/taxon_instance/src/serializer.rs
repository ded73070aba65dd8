//! JSON serialization of resources.
//!
//! Output objects start with `$class`, then `$identifier` and `$timestamp`
//! when present, then declared properties in declaration order (own
//! properties before inherited ones). Relationships are written as
//! `resource:` URIs and read back as unresolved [`Relationship`]s.

use chrono::FixedOffset;
use serde::Deserialize;
use serde_json::{Map, Number as JsonNumber, Value as Json};
use taxon_foundation::{
    CLASS_PROPERTY, Error, ErrorKind, IDENTIFIER_PROPERTY, Primitive, Result, TIMESTAMP_PROPERTY,
    is_reserved_property,
};
use taxon_model::{DeclarationRef, IdentifierField, ModelManager, PropertyRef, PropertyTarget};
use tracing::debug;

use crate::datetime::{format_date_time, parse_date_time, utc_offset};
use crate::validate::InstanceValidator;
use crate::value::{MapInstance, Relationship, Resource, Value};

/// Serializer settings. Unset fields fall back to the serializer's defaults,
/// and from there to the values documented on each field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializerOptions {
    /// Validate instances on the way in and out (default `true`).
    pub validate: Option<bool>,
    /// Offset in minutes used to render date-times and to read offset-less
    /// input (default `0`, rendered with `Z`).
    pub utc_offset: Option<i32>,
    /// Accept only fully qualified date-times (default `true`).
    pub strict_qualified_date_times: Option<bool>,
    /// Write nested resources held in relationship fields as URIs (default `false`).
    pub convert_resources_to_relationships: Option<bool>,
    /// Allow nested resources in relationship fields on output (default `false`).
    pub permit_resources_for_relationships: Option<bool>,
    /// Read objects in relationship fields as nested resources (default `false`).
    pub accept_resources_for_relationships: Option<bool>,
}

impl SerializerOptions {
    /// Sets validation.
    #[must_use]
    pub const fn with_validate(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Sets the UTC offset in minutes.
    #[must_use]
    pub const fn with_utc_offset(mut self, minutes: i32) -> Self {
        self.utc_offset = Some(minutes);
        self
    }

    /// Sets strict date-time parsing.
    #[must_use]
    pub const fn with_strict_date_times(mut self, strict: bool) -> Self {
        self.strict_qualified_date_times = Some(strict);
        self
    }

    /// Sets conversion of nested resources to relationships.
    #[must_use]
    pub const fn with_convert_resources_to_relationships(mut self, convert: bool) -> Self {
        self.convert_resources_to_relationships = Some(convert);
        self
    }

    /// Sets whether nested resources may stand in for relationships on output.
    #[must_use]
    pub const fn with_permit_resources_for_relationships(mut self, permit: bool) -> Self {
        self.permit_resources_for_relationships = Some(permit);
        self
    }

    /// Sets whether objects are read as nested resources in relationship fields.
    #[must_use]
    pub const fn with_accept_resources_for_relationships(mut self, accept: bool) -> Self {
        self.accept_resources_for_relationships = Some(accept);
        self
    }

    fn or(&self, fallback: &Self) -> Self {
        Self {
            validate: self.validate.or(fallback.validate),
            utc_offset: self.utc_offset.or(fallback.utc_offset),
            strict_qualified_date_times: self
                .strict_qualified_date_times
                .or(fallback.strict_qualified_date_times),
            convert_resources_to_relationships: self
                .convert_resources_to_relationships
                .or(fallback.convert_resources_to_relationships),
            permit_resources_for_relationships: self
                .permit_resources_for_relationships
                .or(fallback.permit_resources_for_relationships),
            accept_resources_for_relationships: self
                .accept_resources_for_relationships
                .or(fallback.accept_resources_for_relationships),
        }
    }
}

/// Options with every fallback applied.
#[derive(Clone, Copy, Debug)]
struct Settings {
    validate: bool,
    offset: FixedOffset,
    render_offset: Option<FixedOffset>,
    strict: bool,
    convert_resources: bool,
    permit_resources: bool,
    accept_resources: bool,
}

impl Settings {
    fn from_options(options: &SerializerOptions) -> Result<Self> {
        let minutes = options.utc_offset.unwrap_or(0);
        let offset = utc_offset(minutes)?;
        Ok(Self {
            validate: options.validate.unwrap_or(true),
            offset,
            render_offset: (minutes != 0).then_some(offset),
            strict: options.strict_qualified_date_times.unwrap_or(true),
            convert_resources: options.convert_resources_to_relationships.unwrap_or(false),
            permit_resources: options.permit_resources_for_relationships.unwrap_or(false),
            accept_resources: options.accept_resources_for_relationships.unwrap_or(false),
        })
    }
}

/// Converts resources to and from JSON.
#[derive(Clone, Debug)]
pub struct Serializer<'m> {
    manager: &'m ModelManager,
    defaults: SerializerOptions,
}

impl<'m> Serializer<'m> {
    /// Creates a serializer with default options.
    #[must_use]
    pub fn new(manager: &'m ModelManager) -> Self {
        Self::with_defaults(manager, SerializerOptions::default())
    }

    /// Creates a serializer whose options apply when a call passes none.
    #[must_use]
    pub const fn with_defaults(manager: &'m ModelManager, defaults: SerializerOptions) -> Self {
        Self { manager, defaults }
    }

    /// The default options.
    #[must_use]
    pub const fn defaults(&self) -> &SerializerOptions {
        &self.defaults
    }

    fn settings(&self, options: Option<&SerializerOptions>) -> Result<Settings> {
        match options {
            Some(options) => Settings::from_options(&options.or(&self.defaults)),
            None => Settings::from_options(&self.defaults),
        }
    }

    fn validator(&self, settings: &Settings) -> InstanceValidator<'m> {
        InstanceValidator::new(self.manager)
            .permit_resources_for_relationships(settings.permit_resources)
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Converts a resource to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the validation failure when validation is on, or an error for
    /// values that cannot be represented.
    pub fn to_json(
        &self,
        resource: &Resource,
        options: Option<&SerializerOptions>,
    ) -> Result<Json> {
        let settings = self.settings(options)?;
        if settings.validate {
            self.validator(&settings).validate(resource)?;
        }
        let json = self.resource_to_json(resource, &settings)?;
        debug!(class = resource.class_name(), "resource serialized");
        Ok(json)
    }

    /// Converts a resource to JSON text.
    ///
    /// # Errors
    ///
    /// As [`Serializer::to_json`].
    pub fn to_string(
        &self,
        resource: &Resource,
        options: Option<&SerializerOptions>,
    ) -> Result<String> {
        let json = self.to_json(resource, options)?;
        serde_json::to_string(&json).map_err(|e| Error::serialization(e.to_string()))
    }

    fn resource_to_json(&self, resource: &Resource, settings: &Settings) -> Result<Json> {
        let decl = self.manager.get_type(resource.class_name())?;
        let mut object = Map::new();
        object.insert(
            CLASS_PROPERTY.to_string(),
            Json::String(decl.fully_qualified_name()),
        );

        let identifier = resource.identifier().map(str::to_string).or_else(|| {
            match decl.identifier().ok().flatten() {
                Some(IdentifierField::Explicit(field)) => {
                    resource.get(&field).and_then(Value::as_str).map(str::to_string)
                }
                _ => None,
            }
        });
        if let Some(identifier) = identifier {
            object.insert(IDENTIFIER_PROPERTY.to_string(), Json::String(identifier));
        }
        if let Some(timestamp) = resource.timestamp() {
            object.insert(
                TIMESTAMP_PROPERTY.to_string(),
                Json::String(format_date_time(timestamp, settings.render_offset)),
            );
        }

        let properties = decl.properties()?;
        for property in &properties {
            if let Some(value) = resource.get(property.name()) {
                let json = self.value_to_json(value, property.is_relationship(), settings)?;
                object.insert(property.name().to_string(), json);
            }
        }
        for (name, value) in resource.properties() {
            if !object.contains_key(name.as_str()) {
                object.insert(name.clone(), self.value_to_json(value, false, settings)?);
            }
        }
        Ok(Json::Object(object))
    }

    fn value_to_json(&self, value: &Value, relationship: bool, settings: &Settings) -> Result<Json> {
        Ok(match value {
            Value::Boolean(b) => Json::Bool(*b),
            Value::String(s) => Json::String(s.clone()),
            Value::Integer(i) => Json::from(*i),
            Value::Double(d) => JsonNumber::from_f64(*d).map(Json::Number).ok_or_else(|| {
                Error::serialization(format!("cannot represent {d} in JSON"))
            })?,
            Value::DateTime(dt) => Json::String(format_date_time(dt, settings.render_offset)),
            Value::Array(items) => Json::Array(
                items
                    .iter()
                    .map(|item| self.value_to_json(item, relationship, settings))
                    .collect::<Result<_>>()?,
            ),
            Value::Relationship(rel) => Json::String(rel.to_uri()),
            Value::Resource(resource) if relationship && settings.convert_resources => {
                let rel = resource.to_relationship().ok_or_else(|| {
                    Error::new(ErrorKind::MissingIdentifier {
                        class: resource.class_name().to_string(),
                    })
                })?;
                Json::String(rel.to_uri())
            }
            Value::Resource(resource) => self.resource_to_json(resource, settings)?,
            Value::Map(map) => self.map_to_json(map, settings)?,
        })
    }

    fn map_to_json(&self, map: &MapInstance, settings: &Settings) -> Result<Json> {
        let relationship = match self.manager.get_type(map.class_name())?.map_types()? {
            Some(types) => types.value_is_relationship,
            None => false,
        };
        let mut object = Map::new();
        object.insert(
            CLASS_PROPERTY.to_string(),
            Json::String(map.class_name().to_string()),
        );
        for (key, value) in map.entries() {
            object.insert(key.clone(), self.value_to_json(value, relationship, settings)?);
        }
        Ok(Json::Object(object))
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Reads a resource from a JSON object.
    ///
    /// `null` property values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` for a non-string `$identifier`,
    /// `UndeclaredProperty` for unknown keys, `TypeMismatch` for values of
    /// the wrong shape, and the validation failure when validation is on.
    pub fn from_json(&self, json: &Json, options: Option<&SerializerOptions>) -> Result<Resource> {
        let settings = self.settings(options)?;
        let resource = self.object_to_resource(json, None, "$", &settings)?;
        if settings.validate {
            self.validator(&settings).validate(&resource)?;
        }
        debug!(class = resource.class_name(), "resource deserialized");
        Ok(resource)
    }

    /// Reads a resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed text, otherwise as
    /// [`Serializer::from_json`].
    pub fn from_str(&self, text: &str, options: Option<&SerializerOptions>) -> Result<Resource> {
        let json: Json =
            serde_json::from_str(text).map_err(|e| Error::serialization(e.to_string()))?;
        self.from_json(&json, options)
    }

    fn object_to_resource(
        &self,
        json: &Json,
        declared: Option<DeclarationRef<'m>>,
        path: &str,
        settings: &Settings,
    ) -> Result<Resource> {
        let Json::Object(object) = json else {
            return Err(Error::type_mismatch(path, "object", json_kind(json)));
        };
        let decl = match (object.get(CLASS_PROPERTY), declared) {
            (Some(Json::String(class)), _) => self.manager.get_type(class)?,
            (Some(other), _) => {
                return Err(Error::type_mismatch(
                    format!("{path}.{CLASS_PROPERTY}"),
                    "string",
                    json_kind(other),
                ));
            }
            (None, Some(declared)) => declared,
            (None, None) => {
                return Err(Error::serialization(format!(
                    "{path}: object has no {CLASS_PROPERTY}"
                )));
            }
        };
        let class = decl.fully_qualified_name();
        let mut resource = Resource::new(class.clone());

        match object.get(IDENTIFIER_PROPERTY) {
            Some(Json::String(id)) => resource.set_identifier(id.clone()),
            None | Some(Json::Null) => {}
            Some(other) => {
                return Err(Error::new(ErrorKind::InvalidIdentifier {
                    class,
                    reason: format!("expected a string, got {}", json_kind(other)),
                }));
            }
        }
        match object.get(TIMESTAMP_PROPERTY) {
            Some(Json::String(ts)) => {
                resource.set_timestamp(parse_date_time(ts, settings.strict, settings.offset)?);
            }
            None | Some(Json::Null) => {}
            Some(other) => {
                return Err(Error::type_mismatch(
                    format!("{path}.{TIMESTAMP_PROPERTY}"),
                    "string",
                    json_kind(other),
                ));
            }
        }

        for (key, value) in object {
            if is_reserved_property(key) || value.is_null() {
                continue;
            }
            let Some(property) = decl.property(key)? else {
                return Err(Error::new(ErrorKind::UndeclaredProperty {
                    class,
                    property: key.clone(),
                    identifier: resource.identifier().unwrap_or_default().to_string(),
                }));
            };
            let field_path = format!("{path}.{key}");
            let value = self.property_from_json(value, &property, &field_path, settings)?;
            resource.set(key.clone(), value);
        }

        if resource.identifier().is_none() {
            if let Some(IdentifierField::Explicit(field)) = decl.identifier()? {
                if let Some(id) = resource.get(&field).and_then(Value::as_str) {
                    let id = id.to_string();
                    resource.set_identifier(id);
                }
            }
        }
        Ok(resource)
    }

    fn property_from_json(
        &self,
        json: &Json,
        property: &PropertyRef<'m>,
        path: &str,
        settings: &Settings,
    ) -> Result<Value> {
        let target = property.target()?;
        if property.is_array() {
            let Json::Array(items) = json else {
                return Err(Error::type_mismatch(
                    path,
                    format!("{}[]", property.property().type_name()),
                    json_kind(json),
                ));
            };
            return items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let item_path = format!("{path}[{i}]");
                    self.element_from_json(item, target, property.is_relationship(), &item_path, settings)
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array);
        }
        self.element_from_json(json, target, property.is_relationship(), path, settings)
    }

    fn element_from_json(
        &self,
        json: &Json,
        target: PropertyTarget<'m>,
        relationship: bool,
        path: &str,
        settings: &Settings,
    ) -> Result<Value> {
        if relationship {
            let default_class = target.declaration().map(|d| d.fully_qualified_name());
            return match json {
                Json::String(uri) => Ok(Value::Relationship(Relationship::from_uri(
                    uri,
                    default_class.as_deref(),
                )?)),
                Json::Object(_) if settings.accept_resources => Ok(Value::Resource(
                    self.object_to_resource(json, target.declaration(), path, settings)?,
                )),
                other => Err(Error::type_mismatch(
                    path,
                    "relationship URI",
                    json_kind(other),
                )),
            };
        }
        match target {
            PropertyTarget::Primitive(p) | PropertyTarget::Scalar(_, p) => {
                primitive_from_json(json, p, path, settings)
            }
            PropertyTarget::Enum(decl) => match json {
                Json::String(s) => Ok(Value::String(s.clone())),
                other => Err(Error::type_mismatch(
                    path,
                    decl.fully_qualified_name(),
                    json_kind(other),
                )),
            },
            PropertyTarget::Class(decl) => Ok(Value::Resource(self.object_to_resource(
                json,
                Some(decl),
                path,
                settings,
            )?)),
            PropertyTarget::Map(decl) => self.map_from_json(json, decl, path, settings),
        }
    }

    fn map_from_json(
        &self,
        json: &Json,
        decl: DeclarationRef<'m>,
        path: &str,
        settings: &Settings,
    ) -> Result<Value> {
        let Json::Object(object) = json else {
            return Err(Error::type_mismatch(
                path,
                decl.fully_qualified_name(),
                json_kind(json),
            ));
        };
        let types = decl
            .map_types()?
            .ok_or_else(|| Error::internal("map declaration without map types"))?;
        let class = match object.get(CLASS_PROPERTY) {
            Some(Json::String(class)) => class.clone(),
            _ => decl.fully_qualified_name(),
        };
        let mut map = MapInstance::new(class);
        for (key, value) in object {
            if key == CLASS_PROPERTY || value.is_null() {
                continue;
            }
            let entry_path = format!("{path}[{key}]");
            let value = self.element_from_json(
                value,
                types.value,
                types.value_is_relationship,
                &entry_path,
                settings,
            )?;
            map.insert(key.clone(), value);
        }
        Ok(Value::Map(map))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn primitive_from_json(
    json: &Json,
    primitive: Primitive,
    path: &str,
    settings: &Settings,
) -> Result<Value> {
    let value = match (primitive, json) {
        (Primitive::Boolean, Json::Bool(b)) => Some(Value::Boolean(*b)),
        (Primitive::String, Json::String(s)) => Some(Value::String(s.clone())),
        (Primitive::DateTime, Json::String(s)) => Some(Value::DateTime(parse_date_time(
            s,
            settings.strict,
            settings.offset,
        )?)),
        (Primitive::Integer | Primitive::Long, Json::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|d| d.fract() == 0.0 && d.abs() < 9.007_199_254_740_992e15)
                    .map(|d| d as i64)
            })
            .map(Value::Integer),
        (Primitive::Double, Json::Number(n)) => n.as_f64().map(Value::Double),
        _ => None,
    };
    value.ok_or_else(|| Error::type_mismatch(path, primitive.name(), json_kind(json)))
}

const fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
