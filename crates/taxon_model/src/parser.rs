//! The seam between source text and model ASTs.
//!
//! Registries never interpret model source themselves; they hand text to a
//! [`ModelParser`] and work with the resulting [`Model`].

use std::fmt;

use taxon_foundation::{Error, ErrorContext, Result};

use crate::ast::Model;

/// Turns model source text into an AST.
pub trait ModelParser: fmt::Debug + Send + Sync {
    /// Parses `text`, attributing diagnostics to `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid model.
    fn parse(&self, text: &str, file_name: Option<&str>) -> Result<Model>;
}

/// Parses the canonical JSON AST.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonAstParser;

impl ModelParser for JsonAstParser {
    fn parse(&self, text: &str, file_name: Option<&str>) -> Result<Model> {
        serde_json::from_str(text).map_err(|e| {
            let mut context = ErrorContext::new().with_position(e.line(), e.column());
            if let Some(file_name) = file_name {
                context = context.with_source(file_name);
            }
            Error::serialization(e.to_string()).with_context(context)
        })
    }
}
