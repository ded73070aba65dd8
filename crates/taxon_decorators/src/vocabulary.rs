//! Vocabularies: per-locale terms for the declarations of one namespace.
//!
//! A term is a `@Term("...")` decorator; additional terms use decorator
//! names starting with `Term_`. The YAML form lists one entry per
//! declaration whose first key is the declaration name:
//!
//! ```yaml
//! locale: en
//! namespace: org.acme@1.0.0
//! declarations:
//!   - Vehicle: A road vehicle
//!     Term_short: Car
//!     properties:
//!       - vin: Vehicle identification number
//!   - Scores: Scores by player
//!     key:
//!       Term: Player
//! ```

use serde_yaml::{Mapping, Value as Yaml};
use taxon_foundation::{Error, Result};
use taxon_model::ast::DecoratorArgument;
use taxon_model::Decorator;

use crate::command::{Command, CommandTarget, DCS_VERSION, DecoratorCommandSet, MapElement};

/// Name of the primary term decorator.
pub const TERM_DECORATOR: &str = "Term";

const TERM_PREFIX: &str = "Term_";

/// True for a term decorator: `Term` or `Term_*` with one string argument.
#[must_use]
pub fn is_term_decorator(decorator: &Decorator) -> bool {
    (decorator.name == TERM_DECORATOR || decorator.name.starts_with(TERM_PREFIX))
        && matches!(decorator.arguments.as_slice(), [DecoratorArgument::String { .. }])
}

/// The terms of one model element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Terms {
    /// The `Term` text.
    pub term: Option<String>,
    /// Additional `Term_*` decorators, by full decorator name.
    pub extra: Vec<(String, String)>,
}

impl Terms {
    /// Returns true when no terms are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.term.is_none() && self.extra.is_empty()
    }

    /// Records a term decorator. Other decorators are ignored.
    pub fn add(&mut self, decorator: &Decorator) {
        let Some(text) = decorator.arguments.first().and_then(DecoratorArgument::as_str) else {
            return;
        };
        if decorator.name == TERM_DECORATOR {
            self.term = Some(text.to_string());
        } else {
            self.extra.push((decorator.name.clone(), text.to_string()));
        }
    }

    /// The terms as decorators, `Term` first.
    #[must_use]
    pub fn decorators(&self) -> Vec<Decorator> {
        let term = |name: &str, text: &str| Decorator::new(name).with_argument(DecoratorArgument::string(text));
        let mut decorators: Vec<Decorator> =
            self.term.iter().map(|text| term(TERM_DECORATOR, text)).collect();
        decorators.extend(self.extra.iter().map(|(name, text)| term(name, text)));
        decorators
    }

    fn write_extra(&self, mapping: &mut Mapping) {
        for (name, text) in &self.extra {
            mapping.insert(Yaml::from(name.as_str()), Yaml::from(text.as_str()));
        }
    }

    fn to_yaml(&self) -> Yaml {
        let mut mapping = Mapping::new();
        if let Some(term) = &self.term {
            mapping.insert(Yaml::from(TERM_DECORATOR), Yaml::from(term.as_str()));
        }
        self.write_extra(&mut mapping);
        Yaml::Mapping(mapping)
    }

    fn from_yaml(yaml: &Yaml, context: &str) -> Result<Self> {
        let mapping = as_mapping(yaml, context)?;
        let mut terms = Self::default();
        for (key, value) in mapping {
            let key = as_str(key, context)?;
            let text = as_str(value, context)?.to_string();
            if key == TERM_DECORATOR {
                terms.term = Some(text);
            } else if key.starts_with(TERM_PREFIX) {
                terms.extra.push((key.to_string(), text));
            } else {
                return Err(vocabulary_error(format!("{context}: unexpected key {key}")));
            }
        }
        Ok(terms)
    }
}

/// The terms of one property or enum value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyTerms {
    /// Property name.
    pub name: String,
    /// Its terms.
    pub terms: Terms,
}

/// The terms of one declaration and its members.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclarationTerms {
    /// Declaration short name.
    pub name: String,
    /// Terms of the declaration itself.
    pub terms: Terms,
    /// Terms of properties or enum values.
    pub properties: Vec<PropertyTerms>,
    /// Terms of a map key type.
    pub key: Option<Terms>,
    /// Terms of a map value type.
    pub value: Option<Terms>,
}

impl DeclarationTerms {
    /// Creates an empty entry.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns true when neither the declaration nor any member has terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
            && self.properties.is_empty()
            && self.key.is_none()
            && self.value.is_none()
    }
}

/// The terms of one namespace in one locale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
    /// Locale, e.g. `en` or `fr-CA`.
    pub locale: String,
    /// Namespace the terms describe.
    pub namespace: String,
    /// Entries in declaration order.
    pub declarations: Vec<DeclarationTerms>,
}

fn vocabulary_error(message: impl Into<String>) -> Error {
    Error::serialization(format!("vocabulary: {}", message.into()))
}

fn as_mapping<'a>(yaml: &'a Yaml, context: &str) -> Result<&'a Mapping> {
    yaml.as_mapping()
        .ok_or_else(|| vocabulary_error(format!("{context}: expected a mapping")))
}

fn as_str<'a>(yaml: &'a Yaml, context: &str) -> Result<&'a str> {
    yaml.as_str()
        .ok_or_else(|| vocabulary_error(format!("{context}: expected a string")))
}

fn optional_str(yaml: &Yaml, context: &str) -> Result<Option<String>> {
    match yaml {
        Yaml::Null => Ok(None),
        other => as_str(other, context).map(|s| Some(s.to_string())),
    }
}

/// Writes `name: term` followed by the extra terms.
fn named_entry(name: &str, terms: &Terms) -> Mapping {
    let mut mapping = Mapping::new();
    let term = terms.term.as_deref().map_or(Yaml::Null, Yaml::from);
    mapping.insert(Yaml::from(name), term);
    terms.write_extra(&mut mapping);
    mapping
}

/// Reads an entry whose first key is the element name.
fn read_named_entry<'a>(
    yaml: &'a Yaml,
    context: &str,
) -> Result<(String, Terms, Vec<(&'a str, &'a Yaml)>)> {
    let mapping = as_mapping(yaml, context)?;
    let mut entries = mapping.iter();
    let Some((name, term)) = entries.next() else {
        return Err(vocabulary_error(format!("{context}: empty entry")));
    };
    let name = as_str(name, context)?.to_string();
    let context = format!("{context}.{name}");
    let mut terms = Terms {
        term: optional_str(term, &context)?,
        extra: Vec::new(),
    };
    let mut rest = Vec::new();
    for (key, value) in entries {
        let key = as_str(key, &context)?;
        if key.starts_with(TERM_PREFIX) {
            terms
                .extra
                .push((key.to_string(), as_str(value, &context)?.to_string()));
        } else {
            rest.push((key, value));
        }
    }
    Ok((name, terms, rest))
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    #[must_use]
    pub fn new(locale: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            namespace: namespace.into(),
            declarations: Vec::new(),
        }
    }

    /// Returns true when no declaration has terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// The `Term` of a declaration, or of one of its properties.
    #[must_use]
    pub fn term(&self, declaration: &str, property: Option<&str>) -> Option<&str> {
        let decl = self.declarations.iter().find(|d| d.name == declaration)?;
        let terms = match property {
            None => &decl.terms,
            Some(property) => &decl.properties.iter().find(|p| p.name == property)?.terms,
        };
        terms.term.as_deref()
    }

    /// Writes the vocabulary as YAML.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the document cannot be emitted.
    pub fn to_yaml(&self) -> Result<String> {
        let declarations = self
            .declarations
            .iter()
            .map(|decl| {
                let mut entry = named_entry(&decl.name, &decl.terms);
                if !decl.properties.is_empty() {
                    let properties = decl
                        .properties
                        .iter()
                        .map(|p| Yaml::Mapping(named_entry(&p.name, &p.terms)))
                        .collect();
                    entry.insert(Yaml::from("properties"), Yaml::Sequence(properties));
                }
                if let Some(key) = &decl.key {
                    entry.insert(Yaml::from("key"), key.to_yaml());
                }
                if let Some(value) = &decl.value {
                    entry.insert(Yaml::from("value"), value.to_yaml());
                }
                Yaml::Mapping(entry)
            })
            .collect();

        let mut document = Mapping::new();
        document.insert(Yaml::from("locale"), Yaml::from(self.locale.as_str()));
        document.insert(Yaml::from("namespace"), Yaml::from(self.namespace.as_str()));
        document.insert(Yaml::from("declarations"), Yaml::Sequence(declarations));
        serde_yaml::to_string(&Yaml::Mapping(document)).map_err(|e| vocabulary_error(e.to_string()))
    }

    /// Reads a vocabulary from YAML.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed YAML or a document without the
    /// vocabulary shape.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let yaml: Yaml = serde_yaml::from_str(text).map_err(|e| vocabulary_error(e.to_string()))?;
        let document = as_mapping(&yaml, "document")?;
        let field = |name: &str| {
            document
                .get(name)
                .ok_or_else(|| vocabulary_error(format!("missing {name}")))
        };
        let mut vocabulary = Self::new(
            as_str(field("locale")?, "locale")?,
            as_str(field("namespace")?, "namespace")?,
        );

        let declarations = match document.get("declarations") {
            None | Some(Yaml::Null) => &[][..],
            Some(Yaml::Sequence(items)) => items.as_slice(),
            Some(_) => return Err(vocabulary_error("declarations: expected a sequence")),
        };
        for item in declarations {
            let (name, terms, rest) = read_named_entry(item, "declarations")?;
            let mut decl = DeclarationTerms {
                terms,
                ..DeclarationTerms::new(name)
            };
            for (key, value) in rest {
                let context = format!("{}.{key}", decl.name);
                match key {
                    "properties" => {
                        let items = value
                            .as_sequence()
                            .ok_or_else(|| vocabulary_error(format!("{context}: expected a sequence")))?;
                        for item in items {
                            let (name, terms, extra) = read_named_entry(item, &context)?;
                            if let Some((key, _)) = extra.first() {
                                return Err(vocabulary_error(format!("{context}.{name}: unexpected key {key}")));
                            }
                            decl.properties.push(PropertyTerms { name, terms });
                        }
                    }
                    "key" => decl.key = Some(Terms::from_yaml(value, &context)?),
                    "value" => decl.value = Some(Terms::from_yaml(value, &context)?),
                    other => return Err(vocabulary_error(format!("{}: unexpected key {other}", decl.name))),
                }
            }
            vocabulary.declarations.push(decl);
        }
        Ok(vocabulary)
    }

    /// The UPSERT commands that attach these terms to their elements.
    #[must_use]
    pub fn to_command_set(&self) -> DecoratorCommandSet {
        let mut set = DecoratorCommandSet::new(
            format!("{}-{}", self.namespace, self.locale),
            DCS_VERSION,
        );
        let base = || CommandTarget::new().namespace(self.namespace.clone());
        for decl in &self.declarations {
            let declaration = || base().declaration(decl.name.clone());
            let mut push = |target: CommandTarget, terms: &Terms| {
                for decorator in terms.decorators() {
                    set.commands.push(Command::upsert(target.clone(), decorator));
                }
            };
            push(declaration(), &decl.terms);
            for property in &decl.properties {
                push(declaration().property(property.name.clone()), &property.terms);
            }
            if let Some(key) = &decl.key {
                push(declaration().map_element(MapElement::Key), key);
            }
            if let Some(value) = &decl.value {
                push(declaration().map_element(MapElement::Value), value);
            }
        }
        set
    }
}
