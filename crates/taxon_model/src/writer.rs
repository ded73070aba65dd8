//! Writing loaded model files to disk.

use std::fs;
use std::path::{Path, PathBuf};

use taxon_foundation::{Error, Result};
use tracing::debug;

use crate::model_file::ModelFile;
use crate::registry::ModelManager;

/// The file name a model is written under: the base name of its source
/// file, or `<namespace>.cto` when it has none.
#[must_use]
pub fn output_file_name(file: &ModelFile) -> String {
    file.file_name()
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .filter(|name| !name.is_empty())
        .map_or_else(|| format!("{}.cto", file.namespace()), str::to_string)
}

impl ModelManager {
    /// Writes every loaded model except the root model into `dir`.
    ///
    /// A file's raw source text is written when available, otherwise its
    /// canonical JSON AST. Externally downloaded files are written only when
    /// `include_external` is set.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created or a file cannot be
    /// written.
    pub fn write_model_files(
        &self,
        dir: impl AsRef<Path>,
        include_external: bool,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| Error::io(format!("cannot create {}: {e}", dir.display())))?;

        let mut written = Vec::new();
        for file in self.get_model_files(false) {
            if file.is_external() && !include_external {
                continue;
            }
            let contents = match file.source() {
                Some(source) => source.to_string(),
                None => serde_json::to_string_pretty(file.ast())
                    .map_err(|e| Error::serialization(e.to_string()))?,
            };
            let path = dir.join(output_file_name(file));
            fs::write(&path, contents)
                .map_err(|e| Error::io(format!("cannot write {}: {e}", path.display())))?;
            debug!(namespace = file.namespace(), path = %path.display(), "model file written");
            written.push(path);
        }
        Ok(written)
    }
}
