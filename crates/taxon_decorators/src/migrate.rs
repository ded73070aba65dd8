//! Migration of command sets between command-set model versions.

use semver::Version;
use serde_json::Value as Json;
use taxon_foundation::{CLASS_PROPERTY, Error, ErrorKind, Result, get_short_name};
use tracing::info;

use crate::command::{DCS_NAMESPACE_NAME, DecoratorCommandSet};

fn parse_version(version: &str) -> Result<Version> {
    Version::parse(version)
        .map_err(|e| Error::invalid_argument(format!("invalid version {version}: {e}")))
}

/// True when a set written against `from` can be rewritten to `to`: same
/// major version and a strictly lower minor version.
///
/// # Errors
///
/// Returns `InvalidArgument` if either version is not semver.
pub fn can_migrate(from: &str, to: &str) -> Result<bool> {
    let from = parse_version(from)?;
    let to = parse_version(to)?;
    Ok(from.major == to.major && from.minor < to.minor)
}

/// Rewrites every command-set `$class` in a JSON tree to `version`.
///
/// Classes from other namespaces are left alone.
///
/// # Errors
///
/// Returns `InvalidArgument` for a malformed command-set class.
pub fn rewrite_classes(json: &mut Json, version: &str) -> Result<()> {
    let prefix = format!("{DCS_NAMESPACE_NAME}@");
    let mut stack = vec![json];
    while let Some(node) = stack.pop() {
        match node {
            Json::Object(object) => {
                for (key, value) in object.iter_mut() {
                    match value {
                        Json::String(class) if key == CLASS_PROPERTY && class.starts_with(&prefix) => {
                            let short = get_short_name(class)?.to_string();
                            *class = format!("{prefix}{version}.{short}");
                        }
                        Json::Object(_) | Json::Array(_) => stack.push(value),
                        _ => {}
                    }
                }
            }
            Json::Array(items) => stack.extend(items.iter_mut()),
            _ => {}
        }
    }
    Ok(())
}

impl DecoratorCommandSet {
    /// Returns this set rewritten to command-set version `version`.
    ///
    /// # Errors
    ///
    /// Returns `MigrationRefused` unless the set's version has the same
    /// major version and a lower minor version than `version`.
    pub fn migrate_to(&self, version: &str) -> Result<Self> {
        let from = self.dcs_version()?;
        if !can_migrate(&from, version)? {
            return Err(Error::new(ErrorKind::MigrationRefused {
                from,
                to: version.to_string(),
            }));
        }
        let mut json = self.to_json()?;
        rewrite_classes(&mut json, version)?;
        let migrated = Self::from_json(&json)?;
        info!(name = %self.name, from = %from, to = version, "decorator command set migrated");
        Ok(migrated)
    }
}
