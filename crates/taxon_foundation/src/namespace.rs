//! Versioned namespaces, fully-qualified names, and primitive types.
//!
//! A namespace is a dotted identifier optionally suffixed with a semantic
//! version (`org.acme@1.2.3`). A fully-qualified type name appends a short
//! name after the last dot (`org.acme@1.2.3.Vehicle`); the version itself may
//! contain dots, so splitting always happens on the *last* separator.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Namespace of the root model every model file implicitly imports.
pub const ROOT_NAMESPACE: &str = "concerto@1.0.0";

/// Namespace of the metamodel that describes model ASTs.
pub const METAMODEL_NAMESPACE: &str = "concerto.metamodel@1.0.0";

/// Short names declared by the root model.
pub const ROOT_TYPES: [&str; 5] = ["Concept", "Asset", "Participant", "Transaction", "Event"];

/// System property names that user-declared fields may never use.
pub const RESERVED_PROPERTIES: [&str; 12] = [
    "$class",
    "$identifier",
    "$timestamp",
    "$classDeclaration",
    "$namespace",
    "$type",
    "$modelManager",
    "$validator",
    "$identifierFieldName",
    "$imports",
    "$superTypes",
    "$id",
];

/// Discriminator carrying an instance's fully-qualified type.
pub const CLASS_PROPERTY: &str = "$class";

/// Shadow field carrying an instance's identifier.
pub const IDENTIFIER_PROPERTY: &str = "$identifier";

/// Timestamp carried by transactions and events.
pub const TIMESTAMP_PROPERTY: &str = "$timestamp";

// =============================================================================
// Namespace
// =============================================================================

/// A parsed namespace: a dotted name plus an optional version.
///
/// The version is kept as text so that callers which disable validation can
/// still round-trip whatever was written; [`Namespace::semver`] parses it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Namespace {
    /// Dotted name without version (e.g. `org.acme`).
    pub name: String,
    /// Version text after the `@`, if any.
    pub version: Option<String>,
}

impl Namespace {
    /// Parses and validates a namespace string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNamespace` if the string is empty, contains more than
    /// one `@`, or carries a version that is not valid semver.
    pub fn parse(ns: &str) -> Result<Self> {
        parse_namespace(ns, true)
    }

    /// Returns true if a version is present.
    #[must_use]
    pub const fn is_versioned(&self) -> bool {
        self.version.is_some()
    }

    /// Parses the version as semver.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNamespace` if the version text is not valid semver.
    pub fn semver(&self) -> Result<Option<semver::Version>> {
        self.version
            .as_deref()
            .map(|v| {
                semver::Version::parse(v).map_err(|e| Error::invalid_namespace(self.to_string(), e.to_string()))
            })
            .transpose()
    }

    /// Returns the same namespace without its version.
    #[must_use]
    pub fn unversioned(&self) -> Self {
        Self {
            name: self.name.clone(),
            version: None,
        }
    }

    /// Qualifies a short type name with this namespace.
    #[must_use]
    pub fn qualify(&self, short_name: &str) -> String {
        fully_qualified_name(&self.to_string(), short_name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{version}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Splits a namespace string into name and version.
///
/// With `validate` off, the version text is accepted as-is; the single-`@`
/// rule is always enforced.
///
/// # Errors
///
/// Returns `InvalidNamespace` for empty input, multiple `@` separators, or
/// (when validating) an invalid semver version.
pub fn parse_namespace(ns: &str, validate: bool) -> Result<Namespace> {
    if ns.is_empty() {
        return Err(Error::invalid_namespace(ns, "namespace is empty"));
    }

    let mut parts = ns.split('@');
    let name = parts.next().unwrap_or_default();
    let version = parts.next();
    if parts.next().is_some() {
        return Err(Error::invalid_namespace(ns, "more than one @ separator"));
    }
    if name.is_empty() {
        return Err(Error::invalid_namespace(ns, "namespace name is empty"));
    }

    if validate {
        if !name.split('.').all(is_valid_identifier) {
            return Err(Error::invalid_namespace(
                ns,
                "namespace segments must be identifiers",
            ));
        }
        if let Some(version) = version {
            semver::Version::parse(version).map_err(|e| Error::invalid_namespace(ns, e.to_string()))?;
        }
    }

    Ok(Namespace {
        name: name.to_string(),
        version: version.map(str::to_string),
    })
}

// =============================================================================
// Fully-qualified names
// =============================================================================

/// Returns the namespace part of a fully-qualified name.
///
/// Returns an empty string for names without a dot.
///
/// # Errors
///
/// Returns `InvalidArgument` for empty input.
pub fn get_namespace(fqn: &str) -> Result<&str> {
    if fqn.is_empty() {
        return Err(Error::invalid_argument("fully-qualified name is empty"));
    }
    Ok(fqn.rfind('.').map_or("", |i| &fqn[..i]))
}

/// Returns the short name part of a fully-qualified name.
///
/// # Errors
///
/// Returns `InvalidArgument` for empty input.
pub fn get_short_name(fqn: &str) -> Result<&str> {
    if fqn.is_empty() {
        return Err(Error::invalid_argument("fully-qualified name is empty"));
    }
    Ok(fqn.rfind('.').map_or(fqn, |i| &fqn[i + 1..]))
}

/// Joins a namespace and a short name.
#[must_use]
pub fn fully_qualified_name(namespace: &str, short_name: &str) -> String {
    if namespace.is_empty() {
        short_name.to_string()
    } else {
        format!("{namespace}.{short_name}")
    }
}

/// Returns true if a name is a legal declaration or property identifier.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Returns true if a property name is reserved for system use.
#[must_use]
pub fn is_reserved_property(name: &str) -> bool {
    RESERVED_PROPERTIES.contains(&name)
}

/// Returns true if the fully-qualified name belongs to the root model.
#[must_use]
pub fn is_root_type(fqn: &str) -> bool {
    get_namespace(fqn).is_ok_and(|ns| ns == ROOT_NAMESPACE)
}

// =============================================================================
// Primitive
// =============================================================================

/// The fixed set of primitive types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Primitive {
    /// `true` or `false`.
    Boolean,
    /// UTF-8 text.
    String,
    /// An instant with offset.
    DateTime,
    /// 64-bit floating point.
    Double,
    /// Integer (32-bit range).
    Integer,
    /// Integer (64-bit range).
    Long,
}

impl Primitive {
    /// All primitive types.
    pub const ALL: [Self; 6] = [
        Self::Boolean,
        Self::String,
        Self::DateTime,
        Self::Double,
        Self::Integer,
        Self::Long,
    ];

    /// The type name as it appears in models.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Double => "Double",
            Self::Integer => "Integer",
            Self::Long => "Long",
        }
    }

    /// Looks up a primitive by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Returns true for Integer, Long and Double.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Double | Self::Integer | Self::Long)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns true only for Boolean, String, DateTime, Double, Integer, Long.
#[must_use]
pub fn is_primitive_type(name: &str) -> bool {
    Primitive::from_name(name).is_some()
}
