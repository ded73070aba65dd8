//! Errors, versioned namespaces, and primitive types for Taxon.
//!
//! This crate provides:
//! - [`Error`] - Rich error types with context
//! - [`Namespace`] - Versioned namespace parsing (`name@semver`)
//! - [`Primitive`] - The fixed set of primitive types
//! - Fully-qualified name helpers and the reserved property set

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod namespace;

pub use error::{Bound, Error, ErrorContext, ErrorKind, Missing};
pub use namespace::{
    CLASS_PROPERTY, IDENTIFIER_PROPERTY, METAMODEL_NAMESPACE, Namespace, Primitive,
    RESERVED_PROPERTIES, ROOT_NAMESPACE, ROOT_TYPES, TIMESTAMP_PROPERTY, fully_qualified_name,
    get_namespace, get_short_name, is_primitive_type, is_reserved_property, is_root_type,
    is_valid_identifier, parse_namespace,
};

/// Result type alias using the Taxon error type.
pub type Result<T> = std::result::Result<T, Error>;
