//! One loaded namespace.
//!
//! A [`ModelFile`] wraps a model AST with the lookup tables needed to
//! resolve short type names: local declarations, explicit imports (with
//! aliases), and the implicit root-model import.

use std::collections::{HashMap, HashSet};

use taxon_foundation::{
    Error, ErrorContext, Namespace, ROOT_NAMESPACE, ROOT_TYPES, Result, fully_qualified_name,
    is_primitive_type, is_valid_identifier, parse_namespace,
};

use crate::ast::{
    Declaration, Decorator, DecoratorArgument, Import, Model, Range, TypeIdentifier,
};
use crate::options::ModelManagerOptions;

/// A type brought into scope by an import statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedType {
    /// Name used inside the importing file.
    pub local_name: String,
    /// Namespace the type is imported from.
    pub namespace: String,
    /// Declared name in that namespace.
    pub name: String,
    /// External location of the namespace, if any.
    pub uri: Option<String>,
}

impl ImportedType {
    /// Fully-qualified name of the imported declaration.
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        fully_qualified_name(&self.namespace, &self.name)
    }
}

/// A model AST registered under its namespace.
#[derive(Clone, Debug)]
pub struct ModelFile {
    namespace: Namespace,
    ast: Model,
    file_name: Option<String>,
    source: Option<String>,
    external: bool,
    imported_types: Vec<ImportedType>,
    index: HashMap<String, usize>,
}

impl ModelFile {
    /// Wraps an AST.
    ///
    /// Only the single-`@` rule of the namespace is enforced here; call
    /// [`ModelFile::validate`] for the full single-file checks.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNamespace` if the namespace cannot be split.
    pub fn new(ast: Model, file_name: Option<&str>) -> Result<Self> {
        let namespace = parse_namespace(&ast.namespace, false)?;
        Ok(Self::with_namespace(namespace, ast, file_name))
    }

    /// Wraps a bundled model whose namespace is known to be well-formed.
    pub(crate) fn system(ast: Model, file_name: &str) -> Self {
        let namespace = match ast.namespace.split_once('@') {
            Some((name, version)) => Namespace {
                name: name.to_string(),
                version: Some(version.to_string()),
            },
            None => Namespace {
                name: ast.namespace.clone(),
                version: None,
            },
        };
        Self::with_namespace(namespace, ast, Some(file_name))
    }

    fn with_namespace(namespace: Namespace, ast: Model, file_name: Option<&str>) -> Self {
        let imported_types = ast
            .imports
            .iter()
            .flat_map(|import| {
                import
                    .imported_names()
                    .into_iter()
                    .map(move |(name, local_name)| ImportedType {
                        local_name,
                        namespace: import.namespace().to_string(),
                        name,
                        uri: import.uri().map(str::to_string),
                    })
            })
            .collect();
        let mut index = HashMap::new();
        for (i, decl) in ast.declarations.iter().enumerate() {
            index.entry(decl.name().to_string()).or_insert(i);
        }
        Self {
            namespace,
            ast,
            file_name: file_name.map(str::to_string),
            source: None,
            external: false,
            imported_types,
            index,
        }
    }

    /// Attaches the raw text the AST was parsed from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Marks the file as a downloaded external dependency.
    #[must_use]
    pub fn with_external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }

    /// The namespace string.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.ast.namespace
    }

    /// The parsed namespace.
    #[must_use]
    pub const fn parsed_namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The file name the model was loaded from.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Display name for diagnostics.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| format!("{}.cto", self.namespace()))
    }

    /// Raw source text, when the model was added as text.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns true for downloaded external dependencies.
    #[must_use]
    pub const fn is_external(&self) -> bool {
        self.external
    }

    /// Returns true for the root model.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.namespace() == ROOT_NAMESPACE
    }

    /// The AST as loaded (type references unresolved).
    #[must_use]
    pub const fn ast(&self) -> &Model {
        &self.ast
    }

    /// Declarations in source order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.ast.declarations
    }

    /// Types brought into scope by explicit imports.
    #[must_use]
    pub fn imported_types(&self) -> &[ImportedType] {
        &self.imported_types
    }

    /// A locally declared type by short name.
    #[must_use]
    pub fn local_type(&self, name: &str) -> Option<&Declaration> {
        self.index.get(name).map(|&i| &self.ast.declarations[i])
    }

    /// Returns true if the file declares `name`.
    #[must_use]
    pub fn is_local_type(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Qualifies a short name with this file's namespace.
    #[must_use]
    pub fn qualify(&self, name: &str) -> String {
        fully_qualified_name(self.namespace(), name)
    }

    /// Resolves a short (or aliased) name to a fully-qualified name.
    ///
    /// Local declarations win over imports; the root types are visible in
    /// every file. Primitives are not names and resolve to `None`.
    #[must_use]
    pub fn resolve_type_name(&self, name: &str) -> Option<String> {
        if is_primitive_type(name) {
            return None;
        }
        if self.is_local_type(name) {
            return Some(self.qualify(name));
        }
        if let Some(imported) = self.imported_types.iter().find(|t| t.local_name == name) {
            return Some(imported.fully_qualified_name());
        }
        if !self.is_root() && ROOT_TYPES.contains(&name) {
            return Some(fully_qualified_name(ROOT_NAMESPACE, name));
        }
        None
    }

    /// Resolves a type reference, honoring an explicit namespace.
    #[must_use]
    pub fn resolve_type_identifier(&self, type_ref: &TypeIdentifier) -> Option<String> {
        match &type_ref.namespace {
            Some(namespace) => Some(fully_qualified_name(namespace, &type_ref.name)),
            None => self.resolve_type_name(&type_ref.name),
        }
    }

    /// Returns a copy of the AST with every resolvable type reference
    /// qualified by its declaring namespace.
    ///
    /// Aliases are replaced by the declared name. References that cannot be
    /// resolved are left untouched.
    #[must_use]
    pub fn resolved_ast(&self) -> Model {
        let mut ast = self.ast.clone();
        self.resolve_decorators(&mut ast.decorators);
        for decl in &mut ast.declarations {
            self.resolve_decorators(decl.decorators_mut());
            match decl {
                Declaration::Concept(c)
                | Declaration::Asset(c)
                | Declaration::Participant(c)
                | Declaration::Transaction(c)
                | Declaration::Event(c) => {
                    if let Some(super_type) = &mut c.super_type {
                        self.resolve_in_place(super_type);
                    }
                    for property in &mut c.properties {
                        let field = property.field_mut();
                        if let Some(type_ref) = &mut field.type_ref {
                            self.resolve_in_place(type_ref);
                        }
                        self.resolve_decorators(&mut field.decorators);
                    }
                }
                Declaration::Enum(e) => {
                    for value in &mut e.properties {
                        self.resolve_decorators(&mut value.decorators);
                    }
                }
                Declaration::Map(m) => {
                    let key = m.key.element_mut();
                    if let Some(type_ref) = &mut key.type_ref {
                        self.resolve_in_place(type_ref);
                    }
                    self.resolve_decorators(&mut key.decorators);
                    let value = m.value.element_mut();
                    if let Some(type_ref) = &mut value.type_ref {
                        self.resolve_in_place(type_ref);
                    }
                    self.resolve_decorators(&mut value.decorators);
                }
                Declaration::BooleanScalar(_)
                | Declaration::IntegerScalar(_)
                | Declaration::LongScalar(_)
                | Declaration::DoubleScalar(_)
                | Declaration::StringScalar(_)
                | Declaration::DateTimeScalar(_) => {}
            }
        }
        ast
    }

    fn resolve_in_place(&self, type_ref: &mut TypeIdentifier) {
        if type_ref.namespace.is_some() {
            return;
        }
        if let Some(fqn) = self.resolve_type_name(&type_ref.name) {
            if let Some((namespace, name)) = fqn.rsplit_once('.') {
                type_ref.namespace = Some(namespace.to_string());
                type_ref.name = name.to_string();
            }
        }
    }

    fn resolve_decorators(&self, decorators: &mut [Decorator]) {
        for decorator in decorators {
            for argument in &mut decorator.arguments {
                if let DecoratorArgument::TypeReference { type_ref, .. } = argument {
                    self.resolve_in_place(type_ref);
                }
            }
        }
    }

    /// Builds an `IllegalModel` error located in this file.
    #[must_use]
    pub fn illegal(&self, message: impl Into<String>, location: Option<&Range>) -> Error {
        let mut context = ErrorContext::new().with_source(self.display_name());
        if let Some(range) = location {
            context = context.with_position(range.start.line, range.start.column);
        }
        Error::illegal_model(message).with_context(context)
    }

    /// Single-file validation.
    ///
    /// Checks the namespace, imports and declaration names without looking
    /// at any other file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNamespace` for a malformed namespace and
    /// `IllegalModel` for any other violation.
    pub fn validate(&self, options: &ModelManagerOptions) -> Result<()> {
        let namespace = Namespace::parse(self.namespace())?;
        if options.strict && !namespace.is_versioned() {
            return Err(self.illegal(
                format!("namespace {namespace} must be versioned in strict mode"),
                None,
            ));
        }

        for import in &self.ast.imports {
            self.validate_import(import, &namespace, options)?;
        }

        let mut seen = HashSet::new();
        for decl in &self.ast.declarations {
            let name = decl.name();
            if !is_valid_identifier(name) {
                return Err(self.illegal(
                    format!("invalid declaration name \"{name}\""),
                    decl.location(),
                ));
            }
            if is_primitive_type(name) {
                return Err(self.illegal(
                    format!("declaration {name} shadows a primitive type"),
                    decl.location(),
                ));
            }
            if !seen.insert(name) {
                return Err(self.illegal(
                    format!("duplicate declaration {name} in namespace {namespace}"),
                    decl.location(),
                ));
            }
            if matches!(decl, Declaration::Map(_)) && !options.enable_map_type {
                return Err(self.illegal(
                    format!("map declaration {name} is not supported; map types are disabled"),
                    decl.location(),
                ));
            }
            self.validate_decorators(decl)?;
        }
        self.unique_decorators(&self.ast.decorators, self.namespace(), None)
    }

    /// Rejects two decorators of the same name on any one element.
    fn validate_decorators(&self, decl: &Declaration) -> Result<()> {
        let name = decl.name();
        let location = decl.location();
        self.unique_decorators(decl.decorators(), name, location)?;
        match decl {
            Declaration::Enum(e) => {
                for value in &e.properties {
                    self.unique_decorators(&value.decorators, &format!("{name}.{}", value.name), location)?;
                }
            }
            Declaration::Map(map) => {
                self.unique_decorators(&map.key.element().decorators, &format!("{name}.KEY"), location)?;
                self.unique_decorators(&map.value.element().decorators, &format!("{name}.VALUE"), location)?;
            }
            other => {
                for property in other.as_class().map(|c| c.properties.as_slice()).unwrap_or_default() {
                    let element = format!("{name}.{}", property.name());
                    self.unique_decorators(&property.field().decorators, &element, location)?;
                }
            }
        }
        Ok(())
    }

    fn unique_decorators(&self, decorators: &[Decorator], element: &str, location: Option<&Range>) -> Result<()> {
        let mut names = HashSet::new();
        for decorator in decorators {
            if !names.insert(decorator.name.as_str()) {
                return Err(self.illegal(
                    format!("duplicate decorator {} on {element}", decorator.name),
                    location,
                ));
            }
        }
        Ok(())
    }

    fn validate_import(
        &self,
        import: &Import,
        namespace: &Namespace,
        options: &ModelManagerOptions,
    ) -> Result<()> {
        let imported = Namespace::parse(import.namespace())?;
        match import {
            Import::All { .. } => {
                return Err(self.illegal(
                    format!("wildcard import of {imported} is not supported"),
                    None,
                ));
            }
            Import::Types {
                types,
                aliased_types,
                ..
            } => {
                if !aliased_types.is_empty() && !options.import_aliasing {
                    return Err(self.illegal(
                        format!("aliased imports from {imported} are disabled"),
                        None,
                    ));
                }
                for alias in aliased_types {
                    if !types.contains(&alias.name) {
                        return Err(self.illegal(
                            format!("alias {} names a type not imported from {imported}", alias.name),
                            None,
                        ));
                    }
                    if is_primitive_type(&alias.aliased_name) {
                        return Err(self.illegal(
                            format!("type {} cannot be aliased to primitive {}", alias.name, alias.aliased_name),
                            None,
                        ));
                    }
                }
            }
            Import::Type { .. } => {}
        }

        if !imported.is_versioned() {
            if namespace.is_versioned() {
                return Err(self.illegal(
                    format!(
                        "cannot import unversioned namespace {imported} from versioned namespace {namespace}"
                    ),
                    None,
                ));
            }
            if options.strict {
                return Err(self.illegal(
                    format!("import of {imported} must be versioned in strict mode"),
                    None,
                ));
            }
        }
        Ok(())
    }
}
