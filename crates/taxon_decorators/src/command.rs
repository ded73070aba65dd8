//! The decorator command set model.
//!
//! Command sets are read from and written to their canonical JSON form.
//! `$class` discriminators are kept as text so that sets written against an
//! older command-set version survive until they are migrated.

use serde::{Deserialize, Serialize};
use taxon_foundation::{Error, Result, get_namespace, parse_namespace};
use taxon_model::Decorator;

/// Unversioned namespace of the command-set model.
pub const DCS_NAMESPACE_NAME: &str = "org.accordproject.decoratorcommands";

/// The command-set version this crate reads and writes.
pub const DCS_VERSION: &str = "0.3.0";

/// Versioned namespace of the command-set model.
pub const DCS_NAMESPACE: &str = "org.accordproject.decoratorcommands@0.3.0";

fn dcs_class(short_name: &str) -> String {
    format!("{DCS_NAMESPACE}.{short_name}")
}

fn set_class() -> String {
    dcs_class("DecoratorCommandSet")
}

fn command_class() -> String {
    dcs_class("Command")
}

fn target_class() -> String {
    dcs_class("CommandTarget")
}

/// How a command attaches its decorator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandType {
    /// Replace a decorator of the same name, or append.
    #[serde(rename = "UPSERT")]
    Upsert,
    /// Append; a decorator of the same name is an error.
    #[serde(rename = "APPEND")]
    Append,
    /// Any other value, rejected when the command is applied.
    #[serde(untagged)]
    Unknown(String),
}

impl CommandType {
    /// The wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Upsert => "UPSERT",
            Self::Append => "APPEND",
            Self::Unknown(other) => other,
        }
    }
}

/// Which part of a map declaration a command decorates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MapElement {
    /// The key type.
    Key,
    /// The value type.
    Value,
    /// Both key and value types.
    KeyValue,
}

/// Selects the model elements a command applies to. Absent fields match
/// everything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTarget {
    /// Discriminator.
    #[serde(rename = "$class", default = "target_class")]
    pub class: String,
    /// Namespace, with or without version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Declaration short name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
    /// A single property name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Several property names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
    /// Metamodel class of the property or map element, e.g.
    /// `concerto.metamodel@1.0.0.StringProperty`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Map element selector.
    #[serde(rename = "mapElement", default, skip_serializing_if = "Option::is_none")]
    pub map_element: Option<MapElement>,
}

impl Default for CommandTarget {
    fn default() -> Self {
        Self {
            class: target_class(),
            namespace: None,
            declaration: None,
            property: None,
            properties: None,
            type_name: None,
            map_element: None,
        }
    }
}

impl CommandTarget {
    /// A target matching every element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Restricts to a declaration.
    #[must_use]
    pub fn declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    /// Restricts to one property.
    #[must_use]
    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Restricts to any of several properties.
    #[must_use]
    pub fn properties<S: Into<String>>(mut self, properties: impl IntoIterator<Item = S>) -> Self {
        self.properties = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts to a metamodel class.
    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Selects map elements.
    #[must_use]
    pub const fn map_element(mut self, element: MapElement) -> Self {
        self.map_element = Some(element);
        self
    }
}

/// Attaches one decorator to every element its target selects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Discriminator.
    #[serde(rename = "$class", default = "command_class")]
    pub class: String,
    /// Element selector.
    pub target: CommandTarget,
    /// The decorator to attach.
    pub decorator: Decorator,
    /// Attachment mode.
    #[serde(rename = "type")]
    pub command_type: CommandType,
    /// Namespace used to qualify type-reference arguments of the decorator.
    #[serde(
        rename = "decoratorNamespace",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub decorator_namespace: Option<String>,
}

impl Command {
    /// Creates a command.
    #[must_use]
    pub fn new(command_type: CommandType, target: CommandTarget, decorator: Decorator) -> Self {
        Self {
            class: command_class(),
            target,
            decorator,
            command_type,
            decorator_namespace: None,
        }
    }

    /// An UPSERT command.
    #[must_use]
    pub fn upsert(target: CommandTarget, decorator: Decorator) -> Self {
        Self::new(CommandType::Upsert, target, decorator)
    }

    /// An APPEND command.
    #[must_use]
    pub fn append(target: CommandTarget, decorator: Decorator) -> Self {
        Self::new(CommandType::Append, target, decorator)
    }
}

/// A named, versioned list of commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoratorCommandSet {
    /// Discriminator, carrying the command-set version.
    #[serde(rename = "$class")]
    pub class: String,
    /// Set name.
    pub name: String,
    /// Version of the set itself.
    pub version: String,
    /// Commands, applied in order.
    pub commands: Vec<Command>,
}

impl DecoratorCommandSet {
    /// Creates an empty set at the current command-set version.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            class: set_class(),
            name: name.into(),
            version: version.into(),
            commands: Vec::new(),
        }
    }

    /// Appends a command.
    #[must_use]
    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// The command-set model version this set was written against.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `$class` is not a versioned command-set
    /// class.
    pub fn dcs_version(&self) -> Result<String> {
        dcs_version_of(&self.class)
    }

    /// Reads a set from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the JSON does not have the set's shape.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        Self::deserialize(json).map_err(|e| Error::serialization(format!("decorator command set: {e}")))
    }

    /// Writes the set as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if a value cannot be represented.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::serialization(e.to_string()))
    }
}

/// The command-set version named by a command-set `$class`.
///
/// # Errors
///
/// Returns `InvalidArgument` for classes outside the command-set namespace
/// or without a version.
pub fn dcs_version_of(class: &str) -> Result<String> {
    let namespace = parse_namespace(get_namespace(class)?, false)?;
    match namespace.version {
        Some(version) if namespace.name == DCS_NAMESPACE_NAME => Ok(version),
        _ => Err(Error::invalid_argument(format!(
            "{class} is not a versioned {DCS_NAMESPACE_NAME} class"
        ))),
    }
}
