//! The model registry.
//!
//! A [`ModelManager`] owns every loaded [`ModelFile`], keyed by namespace,
//! and answers type lookups across them. Files are held in a persistent map
//! so that bulk mutations can stage their work on a cheap clone and swap it
//! in only once cross-file validation has passed.

use std::collections::HashMap;
use std::sync::Arc;

use im::OrdMap;
use taxon_foundation::{
    Error, ErrorContext, ErrorKind, Namespace, ROOT_NAMESPACE, Result, get_namespace, get_short_name,
    is_primitive_type,
};
use tracing::{debug, info, warn};

use crate::ast::{DeclarationKind, Model, Models};
use crate::introspect::DeclarationRef;
use crate::model_file::ModelFile;
use crate::options::ModelManagerOptions;
use crate::parser::{JsonAstParser, ModelParser};
use crate::system::{ROOT_FILE_NAME, root_model};

/// Owns loaded model files and resolves types across them.
#[derive(Clone, Debug)]
pub struct ModelManager {
    options: ModelManagerOptions,
    parser: Arc<dyn ModelParser>,
    files: OrdMap<String, ModelFile>,
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelManager {
    /// Creates a registry holding only the root model.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ModelManagerOptions::default())
    }

    /// Creates a registry with the given options.
    #[must_use]
    pub fn with_options(options: ModelManagerOptions) -> Self {
        let mut files = OrdMap::new();
        files.insert(
            ROOT_NAMESPACE.to_string(),
            ModelFile::system(root_model(), ROOT_FILE_NAME),
        );
        Self {
            options,
            parser: Arc::new(JsonAstParser),
            files,
        }
    }

    /// Replaces the parser used for textual models.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn ModelParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Builds a registry from a set of ASTs, validating them together.
    ///
    /// # Errors
    ///
    /// Returns the first single-file or cross-file validation failure.
    pub fn from_ast(models: Models, options: ModelManagerOptions) -> Result<Self> {
        let mut manager = Self::with_options(options);
        manager.add_models(models.models.into_iter().map(|m| (m, None)))?;
        Ok(manager)
    }

    /// The registry's options.
    #[must_use]
    pub const fn options(&self) -> &ModelManagerOptions {
        &self.options
    }

    /// The parser used for textual models.
    #[must_use]
    pub fn parser(&self) -> &dyn ModelParser {
        self.parser.as_ref()
    }

    // =========================================================================
    // Adding and removing models
    // =========================================================================

    /// Adds one model.
    ///
    /// Unless `validate_on_add` is off, the file is validated on its own
    /// first. Once every namespace imported by the loaded files is present,
    /// the new file's imports and declarations are also checked against the
    /// registry, so identifier and inheritance errors surface here rather
    /// than at the next [`ModelManager::validate_all`]. The registry is
    /// unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNamespace` naming the earlier file if the namespace
    /// is already loaded, or the validation failure.
    pub fn add_model(&mut self, ast: Model, file_name: Option<&str>) -> Result<ModelFile> {
        let file = ModelFile::new(ast, file_name)?;
        self.add_file(file)
    }

    /// Parses and adds one textual model.
    ///
    /// # Errors
    ///
    /// Returns parse failures as well as those of [`ModelManager::add_model`].
    pub fn add_model_text(&mut self, text: &str, file_name: Option<&str>) -> Result<ModelFile> {
        let file = self.parse_file(text, file_name)?;
        self.add_file(file)
    }

    fn parse_file(&self, text: &str, file_name: Option<&str>) -> Result<ModelFile> {
        let ast = self.parser.parse(text, file_name)?;
        Ok(ModelFile::new(ast, file_name)?.with_source(text))
    }

    fn add_file(&mut self, file: ModelFile) -> Result<ModelFile> {
        let mut staged = self.clone();
        let result = staged.insert(file).and_then(|file| {
            if staged.options.validate_on_add && staged.dependencies_loaded() {
                staged.validate_file(&file)?;
            }
            Ok(file)
        });
        self.commit(staged, result, "add_model")
    }

    pub(crate) fn insert(&mut self, file: ModelFile) -> Result<ModelFile> {
        if self.options.validate_on_add {
            file.validate(&self.options)?;
        }
        if let Some(existing) = self.files.get(file.namespace()) {
            return Err(Error::new(ErrorKind::DuplicateNamespace {
                namespace: file.namespace().to_string(),
                file: file.display_name(),
                existing_file: existing.display_name(),
            }));
        }
        info!(
            namespace = file.namespace(),
            file = file.display_name(),
            "model added"
        );
        self.files.insert(file.namespace().to_string(), file.clone());
        Ok(file)
    }

    /// Adds several models atomically.
    ///
    /// Every file is inserted into a staged copy of the registry, then the
    /// whole set is validated. The staged copy replaces the registry only on
    /// success; on failure the registry is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first insertion or validation failure.
    pub fn add_models<I>(&mut self, models: I) -> Result<Vec<ModelFile>>
    where
        I: IntoIterator<Item = (Model, Option<String>)>,
    {
        let mut staged = self.clone();
        let files = models
            .into_iter()
            .map(|(ast, file_name)| {
                ModelFile::new(ast, file_name.as_deref()).and_then(|file| staged.insert(file))
            })
            .collect::<Result<Vec<_>>>()
            .and_then(|files| staged.validate_all().map(|()| files));
        self.commit(staged, files, "add_models")
    }

    /// Parses and adds several textual models atomically.
    ///
    /// # Errors
    ///
    /// Returns the first parse, insertion or validation failure.
    pub fn add_models_text(&mut self, texts: &[(&str, Option<&str>)]) -> Result<Vec<ModelFile>> {
        let mut staged = self.clone();
        let files = texts
            .iter()
            .map(|(text, file_name)| {
                staged
                    .parse_file(text, *file_name)
                    .and_then(|file| staged.insert(file))
            })
            .collect::<Result<Vec<_>>>()
            .and_then(|files| staged.validate_all().map(|()| files));
        self.commit(staged, files, "add_models_text")
    }

    pub(crate) fn commit<T>(&mut self, staged: Self, result: Result<T>, operation: &str) -> Result<T> {
        match result {
            Ok(value) => {
                *self = staged;
                Ok(value)
            }
            Err(e) => {
                warn!(operation, error = %e, "rolled back registry");
                Err(e)
            }
        }
    }

    /// Replaces the model for an existing namespace.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the namespace is not loaded, or any
    /// validation failure; the registry is unchanged on error.
    pub fn update_model(&mut self, ast: Model, file_name: Option<&str>) -> Result<ModelFile> {
        let file = ModelFile::new(ast, file_name)?;
        if !self.files.contains_key(file.namespace()) {
            return Err(Error::invalid_argument(format!(
                "model file for namespace {} not found",
                file.namespace()
            )));
        }
        let mut staged = self.clone();
        staged.files.remove(file.namespace());
        let result = staged
            .insert(file)
            .and_then(|file| staged.validate_all().map(|()| file));
        self.commit(staged, result, "update_model")
    }

    /// Removes the model for a namespace.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the namespace is not loaded or is the
    /// root namespace.
    pub fn delete_model(&mut self, namespace: &str) -> Result<()> {
        if namespace == ROOT_NAMESPACE {
            return Err(Error::invalid_argument("the root model cannot be removed"));
        }
        if self.files.remove(namespace).is_none() {
            return Err(Error::invalid_argument(format!(
                "model file for namespace {namespace} not found"
            )));
        }
        info!(namespace, "model removed");
        Ok(())
    }

    /// Removes every model except the root model.
    pub fn clear_model_files(&mut self) {
        self.remove_where(|file| !file.is_root());
        debug!("model files cleared");
    }

    pub(crate) fn files_mut(&mut self) -> &mut OrdMap<String, ModelFile> {
        &mut self.files
    }

    pub(crate) fn remove_where(&mut self, predicate: impl Fn(&ModelFile) -> bool) {
        let doomed: Vec<String> = self
            .files
            .iter()
            .filter(|(_, file)| predicate(file))
            .map(|(namespace, _)| namespace.clone())
            .collect();
        for namespace in doomed {
            self.files.remove(&namespace);
        }
    }

    // =========================================================================
    // Cross-file validation
    // =========================================================================

    /// Validates every loaded file against the others.
    ///
    /// Resolves imports and super types, and checks every declaration.
    ///
    /// # Errors
    ///
    /// Returns `TypeNotFound` for imports of missing namespaces or types,
    /// `IllegalModel` for ambiguous or colliding names and declaration rule
    /// violations, and `ClassMustHaveIdentifier` where identifiers are
    /// required.
    pub fn validate_all(&self) -> Result<()> {
        for file in self.files.values() {
            self.validate_imports(file)?;
        }
        for decl in self.declarations() {
            decl.validate()
                .map_err(|e| e.with_frame(decl.fully_qualified_name()))?;
        }
        debug!(files = self.files.len(), "registry validated");
        Ok(())
    }

    /// True when every namespace imported by a loaded file is loaded.
    fn dependencies_loaded(&self) -> bool {
        self.files
            .values()
            .flat_map(ModelFile::imported_types)
            .all(|imported| self.files.contains_key(&imported.namespace))
    }

    /// Checks one loaded file's imports and declarations against the registry.
    fn validate_file(&self, file: &ModelFile) -> Result<()> {
        self.validate_imports(file)?;
        let Some(file) = self.files.get(file.namespace()) else {
            return Ok(());
        };
        for decl in file.declarations() {
            let decl = DeclarationRef::new(self, file, decl);
            decl.validate()
                .map_err(|e| e.with_frame(decl.fully_qualified_name()))?;
        }
        Ok(())
    }

    fn validate_imports(&self, file: &ModelFile) -> Result<()> {
        let context = || ErrorContext::new().with_source(file.display_name());
        let mut by_local: HashMap<&str, String> = HashMap::new();
        let mut versions: HashMap<String, String> = HashMap::new();

        for imported in file.imported_types() {
            let fqn = imported.fully_qualified_name();
            let Some(target) = self.files.get(&imported.namespace) else {
                return Err(
                    Error::namespace_not_found(&fqn, &imported.namespace).with_context(context())
                );
            };
            if !target.is_local_type(&imported.name) {
                return Err(Error::type_not_found(&fqn, &imported.namespace).with_context(context()));
            }
            if let Some(previous) = by_local.insert(&imported.local_name, fqn.clone()) {
                if previous != fqn {
                    return Err(file.illegal(
                        format!(
                            "ambiguous import: {} refers to both {previous} and {fqn}",
                            imported.local_name
                        ),
                        None,
                    ));
                }
            }
            if file.is_local_type(&imported.local_name) {
                return Err(file.illegal(
                    format!(
                        "type {} is declared locally and also imported as {fqn}",
                        imported.local_name
                    ),
                    None,
                ));
            }
            let namespace = Namespace::parse(&imported.namespace)?;
            if let Some(previous) = versions.insert(namespace.name.clone(), imported.namespace.clone()) {
                if previous != imported.namespace {
                    return Err(file.illegal(
                        format!(
                            "namespace {} is imported in two versions: {previous} and {}",
                            namespace.name, imported.namespace
                        ),
                        None,
                    ));
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Confirms that a fully-qualified type is declared.
    ///
    /// Primitive names are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `IllegalModel` carrying `context` if the namespace is not
    /// loaded or does not declare the type.
    pub fn resolve_type(&self, context: &str, fqn: &str) -> Result<String> {
        if is_primitive_type(fqn) {
            return Ok(fqn.to_string());
        }
        let namespace = get_namespace(fqn)?;
        let short_name = get_short_name(fqn)?;
        let Some(file) = self.files.get(namespace) else {
            return Err(Error::illegal_model(format!(
                "{context}: namespace {namespace} of type {fqn} is not loaded"
            )));
        };
        if !file.is_local_type(short_name) {
            return Err(Error::illegal_model(format!(
                "{context}: type {short_name} is not declared in namespace {namespace}"
            )));
        }
        Ok(fqn.to_string())
    }

    /// Looks up a declaration by fully-qualified name.
    ///
    /// # Errors
    ///
    /// Returns `TypeNotFound`, distinguishing a missing namespace from a
    /// type missing in a loaded namespace.
    pub fn get_type(&self, fqn: &str) -> Result<DeclarationRef<'_>> {
        let namespace = get_namespace(fqn)?;
        let short_name = get_short_name(fqn)?;
        let file = self
            .files
            .get(namespace)
            .ok_or_else(|| Error::namespace_not_found(fqn, namespace))?;
        let decl = file
            .local_type(short_name)
            .ok_or_else(|| Error::type_not_found(fqn, namespace))?;
        Ok(DeclarationRef::new(self, file, decl))
    }

    /// Looks up a declaration, returning `None` when absent.
    #[must_use]
    pub fn declaration(&self, fqn: &str) -> Option<DeclarationRef<'_>> {
        self.get_type(fqn).ok()
    }

    /// The model file for a namespace.
    #[must_use]
    pub fn get_model_file(&self, namespace: &str) -> Option<&ModelFile> {
        self.files.get(namespace)
    }

    /// Loaded model files in namespace order.
    ///
    /// The root model is included only when `include_system` is set.
    #[must_use]
    pub fn get_model_files(&self, include_system: bool) -> Vec<&ModelFile> {
        self.files
            .values()
            .filter(|f| include_system || !f.is_root())
            .collect()
    }

    /// Model files whose namespace has the given unversioned name.
    #[must_use]
    pub fn model_files_named(&self, name: &str) -> Vec<&ModelFile> {
        self.files
            .values()
            .filter(|f| f.parsed_namespace().name == name)
            .collect()
    }

    /// Every loaded namespace, including the root namespace.
    #[must_use]
    pub fn get_namespaces(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    /// Every declaration of every loaded file.
    pub fn declarations(&self) -> impl Iterator<Item = DeclarationRef<'_>> {
        self.files.values().flat_map(move |file| {
            file.declarations()
                .iter()
                .map(move |decl| DeclarationRef::new(self, file, decl))
        })
    }

    /// Declarations whose kind satisfies `predicate`, excluding the root model.
    #[must_use]
    pub fn declarations_of_kind(
        &self,
        predicate: impl Fn(DeclarationKind) -> bool,
    ) -> Vec<DeclarationRef<'_>> {
        self.declarations()
            .filter(|d| !d.model_file().is_root() && predicate(d.kind()))
            .collect()
    }

    /// Class declarations (concepts, assets, participants, transactions, events).
    #[must_use]
    pub fn get_class_declarations(&self) -> Vec<DeclarationRef<'_>> {
        self.declarations_of_kind(DeclarationKind::is_class)
    }

    /// Enum declarations.
    #[must_use]
    pub fn get_enum_declarations(&self) -> Vec<DeclarationRef<'_>> {
        self.declarations_of_kind(|k| k == DeclarationKind::Enum)
    }

    /// Map declarations.
    #[must_use]
    pub fn get_map_declarations(&self) -> Vec<DeclarationRef<'_>> {
        self.declarations_of_kind(|k| k == DeclarationKind::Map)
    }

    /// Scalar declarations.
    #[must_use]
    pub fn get_scalar_declarations(&self) -> Vec<DeclarationRef<'_>> {
        self.declarations_of_kind(|k| matches!(k, DeclarationKind::Scalar(_)))
    }

    /// ASTs of every loaded model except the root model.
    ///
    /// With `resolve`, every resolvable type reference is qualified by its
    /// declaring namespace.
    #[must_use]
    pub fn get_ast(&self, resolve: bool) -> Models {
        Models::new(
            self.files
                .values()
                .filter(|f| !f.is_root())
                .map(|f| if resolve { f.resolved_ast() } else { f.ast().clone() })
                .collect(),
        )
    }
}
