//! Taxon - Runtime type system and schema engine for versioned domain models
//!
//! This crate re-exports all layers of the Taxon system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: taxon_decorators - Decorator command sets, extraction, vocabularies
//! Layer 2: taxon_instance   - Resources, validation, factory, serializer
//! Layer 1: taxon_model      - Metamodel AST, model files, registry, validators
//! Layer 0: taxon_foundation - Core types (Error, Namespace, Primitive)
//! ```

pub use taxon_decorators as decorators;
pub use taxon_foundation as foundation;
pub use taxon_instance as instance;
pub use taxon_model as model;
