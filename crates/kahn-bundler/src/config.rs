//! Bundle configuration
//!
//! [`BundleConfig`] is everything one bundling run needs. Its defaults are
//! the stock prefix, suffix and search paths; a `kahn.toml` project file
//! ([`ProjectConfig`]) may override any of them before command-line flags
//! are applied on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::module_id::ModuleId;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the project file
    #[error("Failed to read config file {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

pub const DEFAULT_PREFIX: &str = "(function (__GLOBAL) {";
pub const DEFAULT_SUFFIX: &str = "__GLOBAL[\"{{ MODULE }}\"] = {{ REQUIRE }};\n}(this));";
pub const DEFAULT_PATHS: [&str; 3] = [".", "./lib", "./node_modules"];
pub const DEFAULT_EXTENSION: &str = "js";

/// Settings for one bundling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleConfig {
    /// Module the bundle is built from
    pub root: ModuleId,
    /// Search directories, highest priority first
    pub paths: Vec<PathBuf>,
    /// Text emitted before the registry declaration
    pub prefix: String,
    /// Text emitted last, after token substitution
    pub suffix: String,
    /// Indent width for beautified output; `None` prints compact
    pub beautify: Option<usize>,
    /// Shorten local variable names
    pub mangle: bool,
    /// Source file extension, without the dot
    pub extension: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            root: ModuleId::new(""),
            paths: DEFAULT_PATHS.iter().map(PathBuf::from).collect(),
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            beautify: None,
            mangle: true,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl BundleConfig {
    /// Default settings for bundling `root`.
    pub fn new(root: impl Into<ModuleId>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Root module cannot be empty".to_string(),
            ));
        }

        if ModuleId::is_relative_specifier(self.root.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Root module '{}' must be a bare id, not a relative path",
                self.root
            )));
        }

        if self.paths.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one search path is required".to_string(),
            ));
        }

        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(ConfigError::ValidationError(format!(
                "Invalid extension: '{}'. Give it without the leading dot (e.g., js)",
                self.extension
            )));
        }

        Ok(())
    }
}

/// Project file (kahn.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub bundle: BundleSection,

    /// Directory relative search paths are taken from
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// The `[bundle]` table. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BundleSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<PathBuf>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beautify: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mangle: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// Name of the project file looked up in the working directory.
pub const PROJECT_FILE: &str = "kahn.toml";

impl ProjectConfig {
    /// Load a project file. Relative search paths in it are taken
    /// relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ProjectConfig = content.parse()?;
        config.base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Ok(config)
    }

    /// Overlay the file's settings onto `config`.
    pub fn apply(&self, config: &mut BundleConfig) {
        let section = &self.bundle;
        if let Some(paths) = &section.paths {
            config.paths = paths
                .iter()
                .map(|path| match &self.base_dir {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path.clone(),
                })
                .collect();
        }
        if let Some(prefix) = &section.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(suffix) = &section.suffix {
            config.suffix = suffix.clone();
        }
        if let Some(beautify) = section.beautify {
            config.beautify = Some(beautify).filter(|&indent| indent > 0);
        }
        if let Some(mangle) = section.mangle {
            config.mangle = mangle;
        }
        if let Some(extension) = &section.extension {
            config.extension = extension.clone();
        }
    }
}

impl FromStr for ProjectConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: ProjectConfig = toml::from_str(content)?;
        if let Some(paths) = &config.bundle.paths {
            if paths.is_empty() {
                return Err(ConfigError::ValidationError(
                    "bundle.paths cannot be empty".to_string(),
                ));
            }
        }
        Ok(config)
    }
}
