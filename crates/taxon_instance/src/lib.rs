//! Resource values, instance validation, construction, and JSON serialization for Taxon.
//!
//! This crate provides:
//! - [`Value`], [`Resource`], [`Relationship`] and [`MapInstance`] - Runtime instances
//! - [`InstanceValidator`] - Fail-fast checking of instances against their types
//! - [`Factory`] - Construction of resources with defaults and generated values
//! - [`Serializer`] - Conversion between resources and JSON
//! - [`datetime`] - Strict and legacy date-time parsing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod datetime;
pub mod factory;
pub mod serializer;
pub mod uri;
pub mod validate;
pub mod value;

pub use datetime::{format_date_time, parse_date_time, utc_offset};
pub use factory::{Factory, FactoryOptions, GenerateMode};
pub use serializer::{Serializer, SerializerOptions};
pub use uri::RESOURCE_SCHEME;
pub use validate::{InstanceValidator, validate_resource};
pub use value::{MapInstance, Relationship, Resource, Value};
