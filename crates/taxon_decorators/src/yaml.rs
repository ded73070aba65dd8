//! The simplified YAML form of decorator command sets.
//!
//! `$class` discriminators are dropped and restored from the
//! `decoratorCommandsVersion` key, a command's `type` is written as
//! `action`, and decorators are flattened:
//!
//! ```yaml
//! decoratorCommandsVersion: 0.3.0
//! name: web
//! version: 1.0.0
//! commands:
//! - action: UPSERT
//!   target:
//!     namespace: test@1.0.0
//!     declaration: Person
//!   decorator:
//!     Form: text
//! ```
//!
//! A decorator without arguments is its bare name, one with a single
//! argument is a one-entry mapping, and anything else is a mapping with
//! `name` and `arguments`. Type-reference arguments are written as
//! `typeReference` mappings.

use serde_json::{Map, Number, Value as Json, json};
use serde_yaml::{Mapping, Value as Yaml};
use taxon_foundation::{CLASS_PROPERTY, Error, METAMODEL_NAMESPACE, Result, get_short_name};
use taxon_model::ast::{DecoratorTag, TypeIdentifierTag};

use crate::command::{DCS_NAMESPACE_NAME, DecoratorCommandSet, dcs_version_of};

const VERSION_KEY: &str = "decoratorCommandsVersion";
const TYPE_REFERENCE_KEY: &str = "typeReference";

fn yaml_error(message: impl Into<String>) -> Error {
    Error::serialization(format!("decorator command yaml: {}", message.into()))
}

fn object<'a>(json: &'a Json, context: &str) -> Result<&'a Map<String, Json>> {
    json.as_object()
        .ok_or_else(|| yaml_error(format!("{context}: expected an object")))
}

fn string<'a>(json: Option<&'a Json>, context: &str) -> Result<&'a str> {
    json.and_then(Json::as_str)
        .ok_or_else(|| yaml_error(format!("{context}: expected a string")))
}

fn to_yaml(json: &Json) -> Result<Yaml> {
    serde_yaml::to_value(json).map_err(|e| yaml_error(e.to_string()))
}

fn to_json(yaml: &Yaml) -> Result<Json> {
    serde_json::to_value(yaml).map_err(|e| yaml_error(e.to_string()))
}

fn str_field<'a>(mapping: &'a Mapping, name: &str) -> Result<&'a str> {
    mapping
        .get(name)
        .and_then(Yaml::as_str)
        .ok_or_else(|| yaml_error(format!("{name}: expected a string")))
}

fn key(name: &str) -> Yaml {
    Yaml::from(name)
}

// =============================================================================
// JSON to YAML
// =============================================================================

/// Converts a command set from its canonical JSON form to YAML.
///
/// # Errors
///
/// Returns `Serialization` if the JSON does not have the command-set shape,
/// or `InvalidArgument` if its `$class` is not a versioned command-set
/// class.
pub fn json_to_yaml(json: &Json) -> Result<String> {
    let set = object(json, "command set")?;
    let version = dcs_version_of(string(set.get(CLASS_PROPERTY), "$class")?)?;

    let mut document = Mapping::new();
    document.insert(key(VERSION_KEY), Yaml::from(version));
    for field in ["name", "version"] {
        document.insert(key(field), Yaml::from(string(set.get(field), field)?));
    }

    let commands = match set.get("commands") {
        Some(Json::Array(commands)) => commands,
        _ => return Err(yaml_error("commands: expected an array")),
    };
    let commands = commands
        .iter()
        .map(command_to_yaml)
        .collect::<Result<Vec<_>>>()?;
    document.insert(key("commands"), Yaml::Sequence(commands));

    serde_yaml::to_string(&Yaml::Mapping(document)).map_err(|e| yaml_error(e.to_string()))
}

fn command_to_yaml(json: &Json) -> Result<Yaml> {
    let command = object(json, "command")?;
    let mut mapping = Mapping::new();
    mapping.insert(key("action"), Yaml::from(string(command.get("type"), "type")?));

    let mut target = Mapping::new();
    let target_json = command.get("target").unwrap_or(&Json::Null);
    for (name, value) in object(target_json, "target")? {
        if name != CLASS_PROPERTY {
            target.insert(key(name), to_yaml(value)?);
        }
    }
    mapping.insert(key("target"), Yaml::Mapping(target));

    let decorator = command.get("decorator").unwrap_or(&Json::Null);
    mapping.insert(key("decorator"), decorator_to_yaml(decorator)?);
    if let Some(namespace) = command.get("decoratorNamespace") {
        mapping.insert(key("decoratorNamespace"), to_yaml(namespace)?);
    }
    Ok(Yaml::Mapping(mapping))
}

fn decorator_to_yaml(json: &Json) -> Result<Yaml> {
    let decorator = object(json, "decorator")?;
    let name = string(decorator.get("name"), "decorator.name")?;
    let arguments = match decorator.get("arguments") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(arguments)) => arguments
            .iter()
            .map(argument_to_yaml)
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(yaml_error("decorator.arguments: expected an array")),
    };

    let mut mapping = Mapping::new();
    match <[Yaml; 1]>::try_from(arguments) {
        Ok([argument]) => {
            mapping.insert(key(name), argument);
        }
        Err(arguments) if arguments.is_empty() => return Ok(Yaml::from(name)),
        Err(arguments) => {
            mapping.insert(key("name"), Yaml::from(name));
            mapping.insert(key("arguments"), Yaml::Sequence(arguments));
        }
    }
    Ok(Yaml::Mapping(mapping))
}

fn argument_to_yaml(json: &Json) -> Result<Yaml> {
    let argument = object(json, "argument")?;
    let class = string(argument.get(CLASS_PROPERTY), "argument.$class")?;
    match get_short_name(class)? {
        "DecoratorString" | "DecoratorNumber" | "DecoratorBoolean" => {
            to_yaml(argument.get("value").unwrap_or(&Json::Null))
        }
        "DecoratorTypeReference" => {
            let type_ref = object(argument.get("type").unwrap_or(&Json::Null), "argument.type")?;
            let mut reference = Mapping::new();
            reference.insert(key("name"), Yaml::from(string(type_ref.get("name"), "type.name")?));
            if let Some(namespace) = type_ref.get("namespace") {
                reference.insert(key("namespace"), to_yaml(namespace)?);
            }
            let is_array = argument.get("isArray").and_then(Json::as_bool).unwrap_or(false);
            reference.insert(key("isArray"), Yaml::Bool(is_array));

            let mut mapping = Mapping::new();
            mapping.insert(key(TYPE_REFERENCE_KEY), Yaml::Mapping(reference));
            Ok(Yaml::Mapping(mapping))
        }
        other => Err(yaml_error(format!("unsupported decorator argument {other}"))),
    }
}

// =============================================================================
// YAML to JSON
// =============================================================================

/// Converts a command set from YAML to its canonical JSON form.
///
/// # Errors
///
/// Returns `Serialization` for malformed YAML or a document without the
/// command-set shape.
pub fn yaml_to_json(text: &str) -> Result<Json> {
    let yaml: Yaml = serde_yaml::from_str(text).map_err(|e| yaml_error(e.to_string()))?;
    let document = yaml
        .as_mapping()
        .ok_or_else(|| yaml_error("expected a mapping"))?;
    let field = |name: &str| str_field(document, name);
    let version = field(VERSION_KEY)?;
    let class = |short: &str| format!("{DCS_NAMESPACE_NAME}@{version}.{short}");

    let commands = match document.get("commands") {
        None | Some(Yaml::Null) => &[][..],
        Some(Yaml::Sequence(commands)) => commands.as_slice(),
        Some(_) => return Err(yaml_error("commands: expected a sequence")),
    };
    let commands = commands
        .iter()
        .map(|command| command_to_json(command, &class))
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        CLASS_PROPERTY: class("DecoratorCommandSet"),
        "name": field("name")?,
        "version": field("version")?,
        "commands": commands,
    }))
}

fn command_to_json(yaml: &Yaml, class: &dyn Fn(&str) -> String) -> Result<Json> {
    let command = yaml
        .as_mapping()
        .ok_or_else(|| yaml_error("command: expected a mapping"))?;
    let get = |name: &str| command.get(name).unwrap_or(&Yaml::Null);

    let mut target = Map::new();
    target.insert(CLASS_PROPERTY.to_string(), Json::from(class("CommandTarget")));
    match get("target") {
        Yaml::Null => {}
        Yaml::Mapping(fields) => {
            for (name, value) in fields {
                let name = name
                    .as_str()
                    .ok_or_else(|| yaml_error("target: expected string keys"))?;
                target.insert(name.to_string(), to_json(value)?);
            }
        }
        _ => return Err(yaml_error("target: expected a mapping")),
    }

    let action = get("action")
        .as_str()
        .ok_or_else(|| yaml_error("action: expected a string"))?;
    let mut json = Map::new();
    json.insert(CLASS_PROPERTY.to_string(), Json::from(class("Command")));
    json.insert("target".to_string(), Json::Object(target));
    json.insert("decorator".to_string(), decorator_to_json(get("decorator"))?);
    json.insert("type".to_string(), Json::from(action));
    if let Some(namespace) = command.get("decoratorNamespace") {
        json.insert("decoratorNamespace".to_string(), to_json(namespace)?);
    }
    Ok(Json::Object(json))
}

fn decorator_to_json(yaml: &Yaml) -> Result<Json> {
    let (name, arguments): (&str, Vec<&Yaml>) = match yaml {
        Yaml::String(name) => (name.as_str(), Vec::new()),
        Yaml::Mapping(mapping) => match (mapping.get("name"), mapping.get("arguments")) {
            (Some(Yaml::String(name)), Some(Yaml::Sequence(arguments))) if mapping.len() == 2 => {
                (name.as_str(), arguments.iter().collect())
            }
            _ => {
                let mut entries = mapping.iter();
                match (entries.next(), entries.next()) {
                    (Some((Yaml::String(name), argument)), None) => (name.as_str(), vec![argument]),
                    _ => return Err(yaml_error("decorator: expected a single-entry mapping")),
                }
            }
        },
        _ => return Err(yaml_error("decorator: expected a name or a mapping")),
    };

    let mut decorator = Map::new();
    decorator.insert(CLASS_PROPERTY.to_string(), Json::from(DecoratorTag::CLASS));
    decorator.insert("name".to_string(), Json::from(name));
    if !arguments.is_empty() {
        let arguments = arguments
            .into_iter()
            .map(argument_to_json)
            .collect::<Result<Vec<_>>>()?;
        decorator.insert("arguments".to_string(), Json::Array(arguments));
    }
    Ok(Json::Object(decorator))
}

fn argument_to_json(yaml: &Yaml) -> Result<Json> {
    let literal = |short: &str, value: Json| {
        json!({ CLASS_PROPERTY: format!("{METAMODEL_NAMESPACE}.{short}"), "value": value })
    };
    match yaml {
        Yaml::String(value) => Ok(literal("DecoratorString", Json::from(value.as_str()))),
        Yaml::Bool(value) => Ok(literal("DecoratorBoolean", Json::from(*value))),
        Yaml::Number(number) => {
            let value = number
                .as_f64()
                .and_then(Number::from_f64)
                .ok_or_else(|| yaml_error(format!("{number} is not a finite number")))?;
            Ok(literal("DecoratorNumber", Json::Number(value)))
        }
        Yaml::Mapping(mapping) => {
            let Some(Yaml::Mapping(reference)) = mapping.get(TYPE_REFERENCE_KEY) else {
                return Err(yaml_error("argument: expected a typeReference mapping"));
            };
            let name = reference
                .get("name")
                .and_then(Yaml::as_str)
                .ok_or_else(|| yaml_error("typeReference.name: expected a string"))?;
            let mut type_ref = Map::new();
            type_ref.insert(CLASS_PROPERTY.to_string(), Json::from(TypeIdentifierTag::CLASS));
            type_ref.insert("name".to_string(), Json::from(name));
            if let Some(namespace) = reference.get("namespace").and_then(Yaml::as_str) {
                type_ref.insert("namespace".to_string(), Json::from(namespace));
            }
            let is_array = reference.get("isArray").and_then(Yaml::as_bool).unwrap_or(false);
            Ok(json!({
                CLASS_PROPERTY: format!("{METAMODEL_NAMESPACE}.DecoratorTypeReference"),
                "type": type_ref,
                "isArray": is_array,
            }))
        }
        _ => Err(yaml_error("unsupported decorator argument")),
    }
}

impl DecoratorCommandSet {
    /// Writes the set in its YAML form.
    ///
    /// # Errors
    ///
    /// As [`json_to_yaml`].
    pub fn to_yaml(&self) -> Result<String> {
        json_to_yaml(&self.to_json()?)
    }

    /// Reads a set from its YAML form.
    ///
    /// # Errors
    ///
    /// As [`yaml_to_json`] and [`DecoratorCommandSet::from_json`].
    pub fn from_yaml(text: &str) -> Result<Self> {
        Self::from_json(&yaml_to_json(text)?)
    }
}
