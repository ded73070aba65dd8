//! Fetching external model dependencies.
//!
//! Imports may carry a `uri` naming where the imported namespace can be
//! downloaded from. [`ModelManager::update_external_models`] follows those
//! URIs transitively through a [`ModelDownloader`] and loads the results as
//! external model files.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::join_all;
use taxon_foundation::{Error, ErrorKind, Result};
use tracing::{debug, info, warn};

use crate::ast::Import;
use crate::model_file::ModelFile;
use crate::registry::ModelManager;

/// Retrieves raw model text for an external URI.
#[async_trait]
pub trait ModelDownloader: Send + Sync {
    /// Downloads the model at `uri`.
    ///
    /// # Errors
    ///
    /// Implementations return `MissingDependency` when the URI is
    /// unreachable and `Download` for any other failure.
    async fn download(&self, uri: &str) -> Result<String>;
}

/// Builds a `MissingDependency` error for an unreachable URI.
#[must_use]
pub fn missing_dependency(uri: impl Into<String>, reason: impl Into<String>) -> Error {
    Error::new(ErrorKind::MissingDependency {
        uri: uri.into(),
        reason: reason.into(),
    })
}

fn external_uris(file: &ModelFile) -> impl Iterator<Item = String> + '_ {
    file.ast()
        .imports
        .iter()
        .filter_map(Import::uri)
        .map(str::to_string)
}

impl ModelManager {
    /// Downloads every external dependency and loads it.
    ///
    /// Previously downloaded files are replaced. Downloaded files are
    /// inserted into a staged copy of the registry which replaces this one
    /// only if the whole set validates. If a dependency is unreachable the
    /// call still succeeds, returning no files, provided the cached models
    /// validate offline.
    ///
    /// Dropping the returned future before it completes leaves the
    /// registry unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MissingDependency` naming the unreachable URI when the cached
    /// models do not validate, or any other download, parse or validation
    /// failure.
    pub async fn update_external_models(
        &mut self,
        downloader: &dyn ModelDownloader,
    ) -> Result<Vec<ModelFile>> {
        let fetched = match self.download_external(downloader).await {
            Ok(fetched) => fetched,
            Err(e) if e.is_missing_dependency() => {
                warn!(error = %e, "external dependency unreachable, validating cached models");
                return match self.validate_all() {
                    Ok(()) => Ok(Vec::new()),
                    Err(_) => Err(e),
                };
            }
            Err(e) => return Err(e),
        };

        let mut staged = self.clone();
        staged.remove_where(ModelFile::is_external);
        let result = fetched
            .into_iter()
            .map(|file| {
                staged.files_mut().remove(file.namespace());
                staged.insert(file)
            })
            .collect::<Result<Vec<_>>>()
            .and_then(|files| staged.validate_all().map(|()| files));
        let files = self.commit(staged, result, "update_external_models")?;
        info!(count = files.len(), "external models updated");
        Ok(files)
    }

    async fn download_external(&self, downloader: &dyn ModelDownloader) -> Result<Vec<ModelFile>> {
        let mut seen_uris = HashSet::new();
        let mut seen_namespaces = HashSet::new();
        let mut pending: Vec<String> = self
            .get_model_files(false)
            .into_iter()
            .filter(|f| !f.is_external())
            .flat_map(external_uris)
            .collect();
        let mut fetched = Vec::new();

        while !pending.is_empty() {
            let batch: Vec<String> = pending
                .drain(..)
                .filter(|uri| seen_uris.insert(uri.clone()))
                .collect();
            debug!(count = batch.len(), "downloading external models");
            let texts = join_all(batch.iter().map(|uri| async move {
                (uri, downloader.download(uri).await)
            }))
            .await;

            for (uri, text) in texts {
                let text = text?;
                let ast = self.parser().parse(&text, Some(uri.as_str()))?;
                let file = ModelFile::new(ast, Some(uri.as_str()))?
                    .with_source(text)
                    .with_external(true);
                if !seen_namespaces.insert(file.namespace().to_string()) {
                    debug!(uri = uri.as_str(), namespace = file.namespace(), "duplicate download skipped");
                    continue;
                }
                pending.extend(external_uris(&file));
                fetched.push(file);
            }
        }
        Ok(fetched)
    }
}
