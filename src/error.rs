//! Error taxonomy for the reconciliation engine.
//!
//! Every public engine entry point fails with one of these kinds. The
//! low-level [`Runtime`](crate::runtime::Runtime) keeps `anyhow` errors;
//! collaborators translate them here at their boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the engine and its collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation needs a project but none is open.
    #[error("No active project. Open a project first.")]
    NoActiveProject,

    /// An operation needs a bower.json but the active directory has none.
    #[error("No bower.json found in the active directory.")]
    NoManifest,

    /// The external package manager failed (spawn error, non-zero exit, bad output).
    #[error("Package manager '{operation}' failed: {message}")]
    ExternalTool { operation: String, message: String },

    /// The listing payload did not have the expected shape.
    #[error("Malformed package listing: {0}")]
    MalformedListing(String),

    /// The manifest could not be read or written.
    #[error("Failed to access manifest {path:?}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// The project configuration could not be parsed.
    #[error("Invalid configuration {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

impl EngineError {
    pub fn external(operation: impl Into<String>, message: impl ToString) -> Self {
        EngineError::ExternalTool {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        EngineError::Manifest {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
