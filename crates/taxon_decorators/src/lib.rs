//! Decorator command sets for Taxon.
//!
//! This crate provides:
//! - [`DecoratorCommandSet`] - Typed command sets and their canonical JSON form
//! - [`decorate_models`] - Application of command sets to a registry
//! - [`validate`] and [`validate_command`] - Structural and target validation
//! - [`DecoratorCommandSet::migrate_to`] - Migration between command-set versions
//! - [`extract_decorators`] - Extraction of decorators into command sets and vocabularies
//! - [`Vocabulary`] - Per-locale terms and their YAML form
//! - [`json_to_yaml`] and [`yaml_to_json`] - The simplified YAML form of command sets

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod engine;
pub mod extract;
pub mod matcher;
pub mod migrate;
pub mod model;
pub mod validate;
pub mod vocabulary;
pub mod yaml;

pub use command::{
    Command, CommandTarget, CommandType, DCS_NAMESPACE, DCS_NAMESPACE_NAME, DCS_VERSION,
    DecoratorCommandSet, MapElement, dcs_version_of,
};
pub use engine::{DecorateOptions, apply_decorator, decorate_models, execute_command};
pub use extract::{ExtractOptions, Extraction, extract_decorators};
pub use matcher::{Filter, falsy_or_equal};
pub use migrate::{can_migrate, rewrite_classes};
pub use model::{DCS_FILE_NAME, dcs_model};
pub use validate::{validate, validate_command, validation_registry};
pub use vocabulary::{
    DeclarationTerms, PropertyTerms, TERM_DECORATOR, Terms, Vocabulary, is_term_decorator,
};
pub use yaml::{json_to_yaml, yaml_to_json};
