//! Application of decorator command sets to a registry.
//!
//! Commands are matched against every declaration of every namespace of a
//! deep copy of the registry's resolved ASTs. The decorated ASTs are loaded
//! into a new registry; the input registry is never touched.

use serde::Deserialize;
use taxon_foundation::{Error, ErrorKind, Result, parse_namespace};
use taxon_model::ast::{Declaration, DecoratorArgument, MapDeclaration, TypeIdentifier};
use taxon_model::{Decorator, Model, ModelManager};
use tracing::{debug, info};

use crate::command::{Command, CommandTarget, CommandType, DCS_VERSION, DecoratorCommandSet, MapElement};
use crate::matcher::{Filter, falsy_or_equal};
use crate::validate::{validate, validate_command};

/// `$class` of enum values, matched by `type` filters.
const ENUM_VALUE_CLASS: &str = "concerto.metamodel@1.0.0.EnumProperty";

/// Options for [`decorate_models`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecorateOptions {
    /// Validate the command set against the command-set model first.
    pub validate: bool,
    /// Also check every command's target against the registry.
    pub validate_commands: bool,
    /// Migrate sets written against an older compatible command-set version.
    pub migrate: bool,
    /// Namespace given to unqualified type-reference decorator arguments
    /// when the command has no `decoratorNamespace` of its own.
    pub default_namespace: Option<String>,
}

impl DecorateOptions {
    /// Enables structural validation.
    #[must_use]
    pub const fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Enables target validation; implies structural validation.
    #[must_use]
    pub const fn with_validate_commands(mut self, validate_commands: bool) -> Self {
        self.validate_commands = validate_commands;
        self
    }

    /// Enables migration.
    #[must_use]
    pub const fn with_migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    /// Sets the default decorator namespace.
    #[must_use]
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }
}

/// Attaches `decorator` to a decorator list.
///
/// UPSERT replaces the first decorator with the same name, or appends.
/// APPEND appends.
///
/// # Errors
///
/// Returns `DuplicateDecorator` naming `target` when APPEND finds a
/// decorator with the same name, and `UnknownCommandType` for any other
/// command type.
pub fn apply_decorator(
    decorators: &mut Vec<Decorator>,
    target: &str,
    command_type: &CommandType,
    decorator: &Decorator,
) -> Result<()> {
    let existing = decorators.iter().position(|d| d.name == decorator.name);
    match (command_type, existing) {
        (CommandType::Upsert, Some(index)) => decorators[index] = decorator.clone(),
        (CommandType::Upsert | CommandType::Append, None) => decorators.push(decorator.clone()),
        (CommandType::Append, Some(_)) => {
            return Err(Error::new(ErrorKind::DuplicateDecorator {
                decorator: decorator.name.clone(),
                target: target.to_string(),
            }));
        }
        (CommandType::Unknown(other), _) => {
            return Err(Error::new(ErrorKind::UnknownCommandType(other.clone())));
        }
    }
    Ok(())
}

/// Applies one command to one declaration of `namespace`.
///
/// Returns the number of elements decorated.
///
/// # Errors
///
/// Returns the failure of [`apply_decorator`].
pub fn execute_command(namespace: &str, declaration: &mut Declaration, command: &Command) -> Result<usize> {
    let target = &command.target;
    let name = parse_namespace(namespace, false)?.name;
    if !falsy_or_equal(Filter::value(target.namespace.as_ref()), &[namespace, name.as_str()])
        || !falsy_or_equal(Filter::value(target.declaration.as_ref()), &[declaration.name()])
    {
        return Ok(0);
    }

    let decl_name = declaration.name().to_string();
    let (command_type, decorator) = (&command.command_type, &command.decorator);
    let type_filter = Filter::value(target.type_name.as_ref());

    if let Declaration::Map(map) = declaration {
        return decorate_map(map, target, command_type, decorator);
    }

    if target.property.is_none() && target.properties.is_none() && target.type_name.is_none() {
        apply_decorator(declaration.decorators_mut(), &decl_name, command_type, decorator)?;
        return Ok(1);
    }

    let property_filter = Filter::value(target.property.as_ref());
    let properties_filter = Filter::list(target.properties.as_ref());
    let selects = |name: &str| {
        falsy_or_equal(property_filter, &[name]) && falsy_or_equal(properties_filter, &[name])
    };
    let mut applied = 0;
    match declaration {
        Declaration::Enum(e) => {
            for value in &mut e.properties {
                if selects(value.name.as_str())
                    && falsy_or_equal(type_filter, &[ENUM_VALUE_CLASS])
                {
                    let target = format!("{decl_name}.{}", value.name);
                    apply_decorator(&mut value.decorators, &target, command_type, decorator)?;
                    applied += 1;
                }
            }
        }
        other => {
            let Some(class) = other.as_class_mut() else {
                return Ok(0);
            };
            for property in &mut class.properties {
                if selects(property.name())
                    && falsy_or_equal(type_filter, &[property.class_name()])
                {
                    let target = format!("{decl_name}.{}", property.name());
                    let field = property.field_mut();
                    apply_decorator(&mut field.decorators, &target, command_type, decorator)?;
                    applied += 1;
                }
            }
        }
    }
    Ok(applied)
}

fn decorate_map(
    map: &mut MapDeclaration,
    target: &CommandTarget,
    command_type: &CommandType,
    decorator: &Decorator,
) -> Result<usize> {
    let type_filter = Filter::value(target.type_name.as_ref());
    let (key, value) = match target.map_element {
        Some(MapElement::Key) => (true, false),
        Some(MapElement::Value) => (false, true),
        Some(MapElement::KeyValue) => (true, true),
        None if target.type_name.is_some() => (true, true),
        None => {
            let name = map.name.clone();
            apply_decorator(&mut map.decorators, &name, command_type, decorator)?;
            return Ok(1);
        }
    };

    let mut applied = 0;
    if key && falsy_or_equal(type_filter, &[map.key.class_name()]) {
        let target = format!("{}.KEY", map.name);
        apply_decorator(&mut map.key.element_mut().decorators, &target, command_type, decorator)?;
        applied += 1;
    }
    if value && falsy_or_equal(type_filter, &[map.value.class_name()]) {
        let target = format!("{}.VALUE", map.name);
        apply_decorator(&mut map.value.element_mut().decorators, &target, command_type, decorator)?;
        applied += 1;
    }
    Ok(applied)
}

/// Qualifies unqualified type-reference arguments with `namespace`.
fn qualify_arguments(decorator: &Decorator, namespace: Option<&str>) -> Decorator {
    let Some(namespace) = namespace else {
        return decorator.clone();
    };
    let mut decorator = decorator.clone();
    for argument in &mut decorator.arguments {
        if let DecoratorArgument::TypeReference {
            type_ref: TypeIdentifier {
                namespace: qualified @ None,
                ..
            },
            ..
        } = argument
        {
            *qualified = Some(namespace.to_string());
        }
    }
    decorator
}

/// Applies every command of a set to a copy of the registry.
///
/// Commands run in order; each is matched against every declaration of
/// every model file. The result is a new registry with the same options.
///
/// # Errors
///
/// Returns `MigrationRefused` when migration is on and the set's
/// command-set version cannot be migrated, the structural or target
/// validation failure when validation is on (a set from another
/// command-set version fails structural validation), `DuplicateDecorator` or `UnknownCommandType` from
/// application, and any failure to load the decorated models.
pub fn decorate_models(
    models: &ModelManager,
    set: &DecoratorCommandSet,
    options: &DecorateOptions,
) -> Result<ModelManager> {
    let migrated;
    let mut set = set;
    if options.migrate && set.dcs_version()? != DCS_VERSION {
        migrated = set.migrate_to(DCS_VERSION)?;
        set = &migrated;
    }

    if options.validate || options.validate_commands {
        let registry = validate(set, Some(models))?;
        if options.validate_commands {
            for command in &set.commands {
                validate_command(&registry, command)?;
            }
        }
    }

    let mut files: Vec<(Model, Option<String>)> = models
        .get_model_files(false)
        .into_iter()
        .map(|f| (f.resolved_ast(), f.file_name().map(str::to_string)))
        .collect();

    let mut applied = 0;
    for command in &set.commands {
        let namespace = command
            .decorator_namespace
            .as_deref()
            .or(options.default_namespace.as_deref());
        let command = Command {
            decorator: qualify_arguments(&command.decorator, namespace),
            ..command.clone()
        };
        for (model, _) in &mut files {
            for declaration in &mut model.declarations {
                applied += execute_command(&model.namespace, declaration, &command)?;
            }
        }
        debug!(decorator = %command.decorator.name, "decorator command applied");
    }

    let mut decorated = ModelManager::with_options(models.options().clone());
    decorated.add_models(files)?;
    info!(
        set = %set.name,
        commands = set.commands.len(),
        applied,
        "decorator command set applied"
    );
    Ok(decorated)
}
