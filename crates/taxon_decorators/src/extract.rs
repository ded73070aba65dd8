//! Extraction of decorators from a registry into command sets and
//! vocabularies.
//!
//! The leading term decorators of each declaration, property, enum value or
//! map element become vocabulary entries; every decorator from the first
//! non-term one onwards becomes an UPSERT command targeting that element, so
//! a term that follows another decorator travels in the command set.
//! Namespace-level decorators stay on the model. Applying each vocabulary's
//! command set and then the extracted command set to the stripped registry
//! restores the original ASTs.

use serde::Deserialize;
use taxon_foundation::Result;
use taxon_model::ast::Declaration;
use taxon_model::{Decorator, Model, ModelManager};
use tracing::info;

use crate::command::{Command, CommandTarget, DCS_VERSION, DecoratorCommandSet, MapElement};
use crate::vocabulary::{
    DeclarationTerms, PropertyTerms, TERM_DECORATOR, Terms, Vocabulary, is_term_decorator,
};

/// Options for [`extract_decorators`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Strip extracted decorators from the returned registry.
    pub remove_decorators_from_model: bool,
    /// Locale written into the vocabularies.
    pub locale: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            remove_decorators_from_model: false,
            locale: "en".to_string(),
        }
    }
}

impl ExtractOptions {
    /// Sets whether decorators are stripped.
    #[must_use]
    pub const fn with_remove_decorators(mut self, remove: bool) -> Self {
        self.remove_decorators_from_model = remove;
        self
    }

    /// Sets the vocabulary locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

/// The result of [`extract_decorators`].
#[derive(Clone, Debug)]
pub struct Extraction {
    /// The registry, stripped of decorators if requested.
    pub manager: ModelManager,
    /// One command set per namespace with non-term decorators.
    pub command_sets: Vec<DecoratorCommandSet>,
    /// One vocabulary per namespace with term decorators.
    pub vocabularies: Vec<Vocabulary>,
}

/// Length of the leading run of term decorators that a vocabulary can
/// restore in place: vocabularies write `Term` before any `Term_*`, so a
/// `Term` after another term ends the run.
fn vocabulary_prefix(decorators: &[Decorator]) -> usize {
    let terms = decorators
        .iter()
        .position(|d| !is_term_decorator(d))
        .unwrap_or(decorators.len());
    decorators[..terms]
        .iter()
        .skip(1)
        .position(|d| d.name == TERM_DECORATOR)
        .map_or(terms, |late| late + 1)
}

struct Extractor<'a> {
    remove: bool,
    commands: &'a mut DecoratorCommandSet,
}

impl Extractor<'_> {
    fn take(&mut self, decorators: &mut Vec<Decorator>, target: &CommandTarget) -> Terms {
        let split = vocabulary_prefix(decorators);
        let mut terms = Terms::default();
        for decorator in &decorators[..split] {
            terms.add(decorator);
        }
        for decorator in &decorators[split..] {
            self.commands
                .commands
                .push(Command::upsert(target.clone(), decorator.clone()));
        }
        if self.remove {
            decorators.clear();
        }
        terms
    }

    fn declaration(&mut self, namespace: &str, declaration: &mut Declaration) -> DeclarationTerms {
        let mut entry = DeclarationTerms::new(declaration.name());
        let target = CommandTarget::new()
            .namespace(namespace)
            .declaration(declaration.name());
        entry.terms = self.take(declaration.decorators_mut(), &target);

        let mut member = |name: &str, decorators: &mut Vec<Decorator>, extractor: &mut Self| {
            let terms = extractor.take(decorators, &target.clone().property(name));
            if !terms.is_empty() {
                entry.properties.push(PropertyTerms {
                    name: name.to_string(),
                    terms,
                });
            }
        };
        match declaration {
            Declaration::Enum(e) => {
                for value in &mut e.properties {
                    member(&value.name, &mut value.decorators, &mut *self);
                }
            }
            Declaration::Map(map) => {
                let key = self.take(
                    &mut map.key.element_mut().decorators,
                    &target.clone().map_element(MapElement::Key),
                );
                let value = self.take(
                    &mut map.value.element_mut().decorators,
                    &target.clone().map_element(MapElement::Value),
                );
                entry.key = (!key.is_empty()).then_some(key);
                entry.value = (!value.is_empty()).then_some(value);
            }
            other => {
                if let Some(class) = other.as_class_mut() {
                    for property in &mut class.properties {
                        let name = property.name().to_string();
                        member(&name, &mut property.field_mut().decorators, &mut *self);
                    }
                }
            }
        }
        entry
    }
}

/// Splits the decorators of every model into command sets and vocabularies.
///
/// # Errors
///
/// Returns the failure to reload stripped models.
pub fn extract_decorators(models: &ModelManager, options: &ExtractOptions) -> Result<Extraction> {
    let mut command_sets = Vec::new();
    let mut vocabularies = Vec::new();
    let mut stripped: Vec<(Model, Option<String>)> = Vec::new();

    for file in models.get_model_files(false) {
        let mut ast = file.resolved_ast();
        let namespace = ast.namespace.clone();
        let mut commands = DecoratorCommandSet::new(namespace.clone(), DCS_VERSION);
        let mut vocabulary = Vocabulary::new(options.locale.clone(), namespace.clone());
        let mut extractor = Extractor {
            remove: options.remove_decorators_from_model,
            commands: &mut commands,
        };
        for declaration in &mut ast.declarations {
            let entry = extractor.declaration(&namespace, declaration);
            if !entry.is_empty() {
                vocabulary.declarations.push(entry);
            }
        }
        if !commands.commands.is_empty() {
            command_sets.push(commands);
        }
        if !vocabulary.is_empty() {
            vocabularies.push(vocabulary);
        }
        stripped.push((ast, file.file_name().map(str::to_string)));
    }

    let manager = if options.remove_decorators_from_model {
        let mut manager = ModelManager::with_options(models.options().clone());
        manager.add_models(stripped)?;
        manager
    } else {
        models.clone()
    };
    info!(
        command_sets = command_sets.len(),
        vocabularies = vocabularies.len(),
        "decorators extracted"
    );
    Ok(Extraction {
        manager,
        command_sets,
        vocabularies,
    })
}
