//! Error types for the Taxon type system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every layer of the workspace reports failures through [`Error`]; callers
//! match on [`ErrorKind`] to decide how to react.

use std::fmt;

use thiserror::Error;

/// The main error type for Taxon operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto the context stack, creating the context if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates an invalid namespace error.
    #[must_use]
    pub fn invalid_namespace(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidNamespace {
            namespace: namespace.into(),
            reason: reason.into(),
        })
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument(message.into()))
    }

    /// Creates an illegal model error.
    #[must_use]
    pub fn illegal_model(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalModel {
            message: message.into(),
        })
    }

    /// Creates an error for a namespace that is not loaded.
    #[must_use]
    pub fn namespace_not_found(type_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeNotFound {
            type_name: type_name.into(),
            missing: Missing::Namespace(namespace.into()),
        })
    }

    /// Creates an error for a type absent from a loaded namespace.
    #[must_use]
    pub fn type_not_found(type_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeNotFound {
            type_name: type_name.into(),
            missing: Missing::Type(namespace.into()),
        })
    }

    /// Creates a generic type mismatch error for an instance field.
    #[must_use]
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error reports an unreachable external dependency.
    #[must_use]
    pub const fn is_missing_dependency(&self) -> bool {
        matches!(self.kind, ErrorKind::MissingDependency { .. })
    }
}

/// Which half of a fully-qualified type lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// The namespace itself is not loaded.
    Namespace(String),
    /// The namespace is loaded but does not declare the type.
    Type(String),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace(ns) => write!(f, "namespace {ns} is not loaded"),
            Self::Type(ns) => write!(f, "namespace {ns} does not declare it"),
        }
    }
}

/// Which bound of a numeric or length constraint was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The lower bound.
    Lower,
    /// The upper bound.
    Upper,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lower => write!(f, "lower"),
            Self::Upper => write!(f, "upper"),
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A namespace string is malformed.
    #[error("invalid namespace \"{namespace}\": {reason}")]
    InvalidNamespace {
        /// The offending namespace string.
        namespace: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An argument was empty or otherwise unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A namespace was added twice to the same registry.
    #[error("namespace {namespace} specified in file {file} is already declared in file {existing_file}")]
    DuplicateNamespace {
        /// The duplicated namespace.
        namespace: String,
        /// The file being added.
        file: String,
        /// The file that declared the namespace first.
        existing_file: String,
    },

    /// A fully-qualified type could not be found.
    #[error("type {type_name} not found: {missing}")]
    TypeNotFound {
        /// The requested fully-qualified name.
        type_name: String,
        /// Whether the namespace or the type is missing.
        missing: Missing,
    },

    /// The model set violates a structural rule.
    #[error("illegal model: {message}")]
    IllegalModel {
        /// Human-readable description, including the calling context.
        message: String,
    },

    /// A non-abstract class declares no identifying field.
    #[error("class {class} is not declared as abstract and must define an identifying field")]
    ClassMustHaveIdentifier {
        /// Fully-qualified class name.
        class: String,
    },

    /// A decorator with the same name is already attached.
    #[error("duplicate decorator @{decorator} on {target}")]
    DuplicateDecorator {
        /// Decorator name.
        decorator: String,
        /// Name of the declaration, property or map element.
        target: String,
    },

    /// A decorator command carried an unsupported `type`.
    #[error("unknown command type {0}")]
    UnknownCommandType(String),

    /// A required field is absent from an instance.
    #[error("instance {identifier} of {class} missing required field {field}")]
    MissingRequiredField {
        /// Fully-qualified class name.
        class: String,
        /// Field name.
        field: String,
        /// Instance identifier, or the class name if unidentified.
        identifier: String,
    },

    /// An instance carries a key its class does not declare.
    #[error("instance {identifier} of {class} has property {property} that is not declared")]
    UndeclaredProperty {
        /// Fully-qualified class name.
        class: String,
        /// The undeclared key.
        property: String,
        /// Instance identifier, or the class name if unidentified.
        identifier: String,
    },

    /// A string identifying field is empty.
    #[error("instance of {class} has an empty identifier in field {field}")]
    EmptyIdentifier {
        /// Fully-qualified class name.
        class: String,
        /// The identifying field.
        field: String,
    },

    /// An enum field holds a value outside its declared set.
    #[error("field {field} of {class} has value {value} which is not a member of enum {enumeration}")]
    InvalidEnumValue {
        /// Fully-qualified class name owning the field.
        class: String,
        /// Field name.
        field: String,
        /// Offending value.
        value: String,
        /// Fully-qualified enum name.
        enumeration: String,
    },

    /// A numeric field holds NaN or an infinity.
    #[error("field {field} of {class} has non-finite value {value}")]
    NonFiniteNumber {
        /// Fully-qualified class name.
        class: String,
        /// Field name.
        field: String,
        /// The value (NaN, inf or -inf).
        value: f64,
    },

    /// An abstract type was used as a concrete instance type.
    #[error("cannot instantiate abstract type {class}")]
    AbstractInstantiation {
        /// Fully-qualified class name.
        class: String,
    },

    /// A numeric value falls outside a validator's bounds.
    #[error("{field}: value {value} is outside the {bound} bound {limit}")]
    OutOfRange {
        /// Validated field or validator owner.
        field: String,
        /// Offending value.
        value: String,
        /// Which bound was violated.
        bound: Bound,
        /// The bound's value.
        limit: String,
    },

    /// A string does not match a validator pattern.
    #[error("{field}: value \"{value}\" failed to match validation regex /{pattern}/")]
    PatternMismatch {
        /// Validated field or validator owner.
        field: String,
        /// Offending value.
        value: String,
        /// The regular expression.
        pattern: String,
    },

    /// A string violates a length constraint.
    #[error("{field}: value \"{value}\" violates the {bound} length bound {limit}")]
    LengthOutOfRange {
        /// Validated field or validator owner.
        field: String,
        /// Offending value.
        value: String,
        /// Which bound was violated.
        bound: Bound,
        /// The bound's value.
        limit: usize,
    },

    /// An external model dependency could not be retrieved.
    #[error("missing external dependency {uri}: {reason}")]
    MissingDependency {
        /// The unreachable URI.
        uri: String,
        /// Downloader diagnostic.
        reason: String,
    },

    /// Any other download failure.
    #[error("download failed: {0}")]
    Download(String),

    /// A dotted property path names a missing segment.
    #[error("property {property} does not exist on {class}")]
    PropertyNotFound {
        /// Fully-qualified class name searched.
        class: String,
        /// The missing segment.
        property: String,
    },

    /// A dotted property path traverses a primitive or enum.
    #[error("property path {path} cannot continue past {segment}: it is a primitive or enum")]
    PrimitiveEncountered {
        /// The full dotted path.
        path: String,
        /// The segment that resolved to a primitive or enum.
        segment: String,
    },

    /// An identifier was supplied for a type without an identifying field.
    #[error("type {class} is not identifiable")]
    NotIdentifiable {
        /// Fully-qualified class name.
        class: String,
    },

    /// An identifier is blank.
    #[error("missing identifier for instance of {class}")]
    MissingIdentifier {
        /// Fully-qualified class name.
        class: String,
    },

    /// An identifier is not a string.
    #[error("invalid identifier for instance of {class}: {reason}")]
    InvalidIdentifier {
        /// Fully-qualified class name.
        class: String,
        /// Why the identifier was rejected.
        reason: String,
    },

    /// A value has the wrong shape for its declared type.
    #[error("field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field (or path) being checked.
        field: String,
        /// Expected type.
        expected: String,
        /// Actual value kind.
        actual: String,
    },

    /// A date-time string could not be parsed.
    #[error("invalid date-time \"{value}\": {reason}")]
    InvalidDateTime {
        /// Offending text.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A relationship URI could not be parsed.
    #[error("invalid relationship URI \"{uri}\": {reason}")]
    InvalidRelationshipUri {
        /// Offending URI.
        uri: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A decorator command failed structural or semantic validation.
    #[error("invalid decorator command: {0}")]
    CommandValidation(String),

    /// A decorator command set cannot be migrated to the requested version.
    #[error("cannot migrate decorator command set from {from} to {to}")]
    MigrationRefused {
        /// Version of the input set.
        from: String,
        /// Requested target version.
        to: String,
    },

    /// Encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File system error.
    #[error("io error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Source file name.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Column number in source.
    pub column: Option<usize>,
    /// Declarations and properties being processed, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            line: None,
            column: None,
            stack: Vec::new(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
