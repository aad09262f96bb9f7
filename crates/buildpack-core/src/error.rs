//! Error types for configuration assembly.

use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::RuntimeError;

pub type Result<T> = std::result::Result<T, BuildpackError>;

#[derive(Debug, Error)]
pub enum BuildpackError {
    // Root validation
    #[error(
        "must provide the root directory of the project as `context`; \
         configuration files are looked up in this directory"
    )]
    MissingRoot,

    #[error("provided context '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    // Environment resolution
    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("unrecognized mode '{0}': expected 'production' or 'development'")]
    UnrecognizedMode(String),

    // Extension bus
    #[error("extension '{extension}' failed: {message}")]
    ExtensionDeclaration { extension: String, message: String },

    #[error("no target '{hook}' declared by '{owner}'")]
    UnknownTarget { owner: String, hook: String },

    // Request loading
    #[error("configuration request not found in {}", .0.display())]
    RequestNotFound(PathBuf),

    #[error("invalid configuration request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
