//! Metamodel AST, model files, and the versioned model registry for Taxon.
//!
//! This crate provides:
//! - [`ast`] - The canonical JSON AST of models and declarations
//! - [`builder`] - Fluent construction of ASTs
//! - [`ModelFile`] - One parsed namespace with its imports and declarations
//! - [`ModelManager`] - The registry of loaded namespaces
//! - [`DeclarationRef`] - Inheritance-aware views of declarations
//! - [`NumberValidator`] and [`StringValidator`] - Field constraints
//! - [`ModelDownloader`] - Retrieval of external model dependencies

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod builder;
pub mod download;
pub mod introspect;
pub mod model_file;
pub mod options;
pub mod parser;
pub mod registry;
pub mod system;
pub mod validator;
pub mod writer;

pub use ast::{Declaration, DeclarationKind, Decorator, DecoratorArgument, Model, Models};
pub use download::{ModelDownloader, missing_dependency};
pub use introspect::{
    DeclarationRef, IdentifierField, MapTypes, PropertyRef, PropertyTarget, ResolvedType,
};
pub use model_file::{ImportedType, ModelFile};
pub use options::ModelManagerOptions;
pub use parser::{JsonAstParser, ModelParser};
pub use registry::ModelManager;
pub use system::{METAMODEL_FILE_NAME, ROOT_FILE_NAME, metamodel, root_model};
pub use validator::{Number, NumberValidator, StringValidator};
pub use writer::output_file_name;
