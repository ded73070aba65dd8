//! Structural and semantic validation of decorator command sets.

use taxon_foundation::{Error, ErrorKind, Result, fully_qualified_name};
use taxon_instance::{Serializer, SerializerOptions};
use taxon_model::{ModelFile, ModelManager, ModelManagerOptions, metamodel};
use tracing::debug;

use crate::command::{Command, DecoratorCommandSet};
use crate::model::{DCS_FILE_NAME, dcs_model};

fn command_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::CommandValidation(message.into()))
}

/// Builds the registry used to validate command sets: the metamodel, the
/// command-set model and, optionally, the caller's model files.
///
/// # Errors
///
/// Returns the failure to load the caller's models alongside the bundled
/// ones.
pub fn validation_registry(models: Option<&ModelManager>) -> Result<ModelManager> {
    let mut registry = ModelManager::with_options(ModelManagerOptions::permissive());
    let mut files = vec![(metamodel(), None), (dcs_model(), Some(DCS_FILE_NAME.to_string()))];
    if let Some(models) = models {
        let bundled = [metamodel().namespace, dcs_model().namespace];
        files.extend(
            models
                .get_model_files(false)
                .into_iter()
                .filter(|f| !bundled.iter().any(|ns| ns == f.namespace()))
                .map(|f| (f.ast().clone(), f.file_name().map(str::to_string))),
        );
    }
    registry.add_models(files)?;
    Ok(registry)
}

/// Checks the shape of a command set against the command-set model.
///
/// Targets are not resolved; see [`validate_command`]. Returns the
/// validation registry so that callers can go on to check commands.
///
/// # Errors
///
/// Returns the instance validation failure, e.g. `InvalidEnumValue` for an
/// unknown command type or `MissingRequiredField` for a command without a
/// decorator.
pub fn validate(set: &DecoratorCommandSet, models: Option<&ModelManager>) -> Result<ModelManager> {
    let registry = validation_registry(models)?;
    let json = set.to_json()?;
    let options = SerializerOptions::default().with_validate(true);
    Serializer::new(&registry).from_json(&json, Some(&options))?;
    debug!(set = %set.name, "decorator command set validated");
    Ok(registry)
}

fn find_namespace<'a>(registry: &'a ModelManager, namespace: &str) -> Result<&'a ModelFile> {
    if let Some(file) = registry.get_model_file(namespace) {
        return Ok(file);
    }
    if !namespace.contains('@') {
        if let Some(file) = registry.model_files_named(namespace).into_iter().next() {
            return Ok(file);
        }
    }
    Err(command_error(format!(
        "decorator command references namespace \"{namespace}\" which does not exist"
    )))
}

/// Checks that a command's target names elements that exist.
///
/// # Errors
///
/// Returns `CommandValidation` when the target `type` does not resolve,
/// when the namespace, declaration or any property is missing, or when
/// both `property` and `properties` are given.
pub fn validate_command(registry: &ModelManager, command: &Command) -> Result<()> {
    let target = &command.target;

    if let Some(type_name) = &target.type_name {
        registry
            .resolve_type("DecoratorCommand type", type_name)
            .map_err(|e| command_error(e.to_string()))?;
    }

    if target.property.is_some() && target.properties.is_some() {
        return Err(command_error(
            "decorator command specifies both property and properties",
        ));
    }

    let Some(namespace) = &target.namespace else {
        return Ok(());
    };
    let file = find_namespace(registry, namespace)?;

    let Some(declaration) = &target.declaration else {
        return Ok(());
    };
    let fqn = fully_qualified_name(file.namespace(), declaration);
    let Some(decl) = registry.declaration(&fqn) else {
        return Err(command_error(format!(
            "decorator command references declaration \"{fqn}\" which does not exist"
        )));
    };

    let properties = target
        .property
        .iter()
        .chain(target.properties.iter().flatten());
    for property in properties {
        let exists = if decl.enum_values().is_empty() {
            decl.property(property)?.is_some()
        } else {
            decl.enum_values().iter().any(|v| &v.name == property)
        };
        if !exists {
            return Err(command_error(format!(
                "decorator command references property \"{fqn}.{property}\" which does not exist"
            )));
        }
    }
    Ok(())
}
