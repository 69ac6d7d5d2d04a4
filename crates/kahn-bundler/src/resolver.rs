//! Module path resolution
//!
//! Maps a module id to the first `<search path>/<id>.<extension>` that names
//! an existing regular file.

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::fs::FileSystem;
use crate::module_id::ModuleId;

/// No search path holds a file for the module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Cannot find module '{id}'")]
pub struct ResolveError {
    pub id: ModuleId,
    /// The module whose `require` named `id`; `None` for the root
    pub referrer: Option<ModuleId>,
    /// Every candidate file, in the order tried
    pub tried: Vec<PathBuf>,
}

impl ResolveError {
    pub fn with_referrer(mut self, referrer: Option<&ModuleId>) -> Self {
        self.referrer = referrer.cloned();
        self
    }
}

/// Resolver over an ordered search-path list.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    paths: Vec<PathBuf>,
    extension: String,
}

impl ModuleResolver {
    pub fn new(paths: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            paths,
            extension: extension.into(),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Candidate files for `id`, in priority order.
    pub fn candidates(&self, id: &ModuleId) -> Vec<PathBuf> {
        let file_name = format!("{}.{}", id, self.extension);
        self.paths.iter().map(|dir| dir.join(&file_name)).collect()
    }

    /// Resolve `id` to a file. The first search path holding one wins.
    pub fn resolve(&self, fs: &dyn FileSystem, id: &ModuleId) -> Result<PathBuf, ResolveError> {
        let mut tried = Vec::new();
        for candidate in self.candidates(id) {
            if fs.is_file(&candidate) {
                debug!(module = %id, path = %candidate.display(), "resolved module");
                return Ok(candidate);
            }
            tried.push(candidate);
        }

        Err(ResolveError {
            id: id.clone(),
            referrer: None,
            tried,
        })
    }
}
