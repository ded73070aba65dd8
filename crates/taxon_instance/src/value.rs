//! Runtime instances of declared types.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use im::OrdMap;
use taxon_foundation::get_namespace;

/// A field value of a [`Resource`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean value.
    Boolean(bool),
    /// String value (also enum values).
    String(String),
    /// Integer or Long value.
    Integer(i64),
    /// Double value.
    Double(f64),
    /// Date-time value.
    DateTime(DateTime<FixedOffset>),
    /// Array property value.
    Array(Vec<Value>),
    /// Nested class instance.
    Resource(Resource),
    /// Unresolved reference to another resource.
    Relationship(Relationship),
    /// Map instance.
    Map(MapInstance),
}

impl Value {
    /// Short name of the value's kind, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::String(_) => "String",
            Self::Integer(_) => "Integer",
            Self::Double(_) => "Double",
            Self::DateTime(_) => "DateTime",
            Self::Array(_) => "array",
            Self::Resource(_) => "resource",
            Self::Relationship(_) => "relationship",
            Self::Map(_) => "map",
        }
    }

    /// Attempts to extract a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a number as a double.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to extract a nested resource.
    #[must_use]
    pub const fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(r) => Some(r),
            _ => None,
        }
    }

    /// Attempts to extract a relationship.
    #[must_use]
    pub const fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Self::Relationship(r) => Some(r),
            _ => None,
        }
    }

    /// Attempts to extract array elements.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Resource> for Value {
    fn from(r: Resource) -> Self {
        Self::Resource(r)
    }
}

impl From<Relationship> for Value {
    fn from(r: Relationship) -> Self {
        Self::Relationship(r)
    }
}

impl From<MapInstance> for Value {
    fn from(m: MapInstance) -> Self {
        Self::Map(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Resource
// =============================================================================

/// An instance of a class declaration.
///
/// Properties are held in a persistent map, so cloning is cheap.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    class: String,
    identifier: Option<String>,
    timestamp: Option<DateTime<FixedOffset>>,
    properties: OrdMap<String, Value>,
}

impl Resource {
    /// Creates an empty instance of a fully-qualified class.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            identifier: None,
            timestamp: None,
            properties: OrdMap::new(),
        }
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Sets a property.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Fully-qualified class name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Namespace of the class, if the class name is qualified.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        get_namespace(&self.class).ok()
    }

    /// The `$identifier` value.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Sets the `$identifier` value.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = Some(identifier.into());
    }

    /// The `$timestamp` of a transaction or event.
    #[must_use]
    pub const fn timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        self.timestamp.as_ref()
    }

    /// Sets the `$timestamp`.
    pub fn set_timestamp(&mut self, timestamp: DateTime<FixedOffset>) {
        self.timestamp = Some(timestamp);
    }

    /// A property value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Sets a property value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Removes a property value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    /// Returns true if the property is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Set properties in name order.
    pub fn properties(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.properties.iter()
    }

    /// A relationship pointing at this resource.
    #[must_use]
    pub fn to_relationship(&self) -> Option<Relationship> {
        self.identifier
            .as_ref()
            .map(|id| Relationship::new(self.class.clone(), id.clone()))
    }
}

// =============================================================================
// Relationship
// =============================================================================

/// A typed reference to a resource by identifier.
///
/// Relationships are never dereferenced.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Relationship {
    class: String,
    identifier: String,
}

impl Relationship {
    /// Creates a relationship to `class` instance `identifier`.
    #[must_use]
    pub fn new(class: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            identifier: identifier.into(),
        }
    }

    /// Fully-qualified class name of the target.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Target identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

// =============================================================================
// Maps
// =============================================================================

/// An instance of a map declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct MapInstance {
    class: String,
    entries: Vec<(String, Value)>,
}

impl MapInstance {
    /// Creates an empty instance of a fully-qualified map declaration.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            entries: Vec::new(),
        }
    }

    /// Adds an entry, replacing any entry with the same key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds an entry, replacing any entry with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Fully-qualified map declaration name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
