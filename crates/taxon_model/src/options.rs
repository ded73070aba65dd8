//! Configuration for model registries.

use serde::Deserialize;

/// Configuration for a [`ModelManager`](crate::ModelManager).
///
/// Controls which model features are accepted and how eagerly files are
/// validated.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelManagerOptions {
    /// Every namespace and import must carry a version.
    pub strict: bool,

    /// Every non-abstract class declaration must be identified.
    pub require_identifiers: bool,

    /// Map declarations are accepted.
    pub enable_map_type: bool,

    /// Aliased imports (`{Car as Vehicle}`) are accepted.
    pub import_aliasing: bool,

    /// Run single-file validation when a model is added.
    pub validate_on_add: bool,
}

impl Default for ModelManagerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            require_identifiers: true,
            enable_map_type: true,
            import_aliasing: true,
            validate_on_add: true,
        }
    }
}

impl ModelManagerOptions {
    /// Creates a configuration requiring versioned namespaces.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Creates the permissive configuration used by internal validation
    /// registries: identifiers are optional and nothing is validated on add.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            require_identifiers: false,
            validate_on_add: false,
            ..Self::default()
        }
    }

    /// Builder method to set strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builder method to set whether identifiers are required.
    #[must_use]
    pub fn with_require_identifiers(mut self, require: bool) -> Self {
        self.require_identifiers = require;
        self
    }

    /// Builder method to enable or disable map declarations.
    #[must_use]
    pub fn with_map_type(mut self, enabled: bool) -> Self {
        self.enable_map_type = enabled;
        self
    }

    /// Builder method to enable or disable aliased imports.
    #[must_use]
    pub fn with_import_aliasing(mut self, enabled: bool) -> Self {
        self.import_aliasing = enabled;
        self
    }

    /// Builder method to set validation on add.
    #[must_use]
    pub fn with_validate_on_add(mut self, validate: bool) -> Self {
        self.validate_on_add = validate;
        self
    }
}
