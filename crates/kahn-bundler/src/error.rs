//! Bundling errors
//!
//! Every failure of a bundling run surfaces as one [`BundleError`]. Errors
//! tied to a source file carry its text, so a diagnostic can be rendered
//! without touching the filesystem again.

use kahn_parser::{Span, SyntaxError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::module_id::ModuleId;
use crate::resolver::ResolveError;
use crate::sort::CycleError;

/// Stable error codes, printed as `error[E0001]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Resolution,
    Read,
    Parse,
    DynamicDependency,
    Cycle,
    FormatViolation,
    Config,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Resolution => "E0001",
            ErrorCode::Read => "E0002",
            ErrorCode::Parse => "E0003",
            ErrorCode::DynamicDependency => "E0004",
            ErrorCode::Cycle => "E0005",
            ErrorCode::FormatViolation => "E0006",
            ErrorCode::Config => "E0007",
        }
    }
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error("Failed to read module '{id}' from {}: {source}", path.display())]
    Read {
        id: ModuleId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Module '{id}' has {} syntax error(s)", errors.len())]
    Parse {
        id: ModuleId,
        path: PathBuf,
        source_text: String,
        errors: Vec<SyntaxError>,
    },

    #[error("Module '{id}' calls require with a non-literal argument")]
    DynamicDependency {
        id: ModuleId,
        path: PathBuf,
        source_text: String,
        span: Span,
    },

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("Module '{id}': {message}")]
    FormatViolation {
        id: ModuleId,
        path: PathBuf,
        source_text: String,
        /// Offending node; `None` when the violation is the absence of one
        span: Option<Span>,
        message: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BundleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BundleError::Resolution(_) => ErrorCode::Resolution,
            BundleError::Read { .. } => ErrorCode::Read,
            BundleError::Parse { .. } => ErrorCode::Parse,
            BundleError::DynamicDependency { .. } => ErrorCode::DynamicDependency,
            BundleError::Cycle(_) => ErrorCode::Cycle,
            BundleError::FormatViolation { .. } => ErrorCode::FormatViolation,
            BundleError::Config(_) => ErrorCode::Config,
        }
    }
}

pub type BundleResult<T> = Result<T, BundleError>;
