//! File-status runtime abstraction
//!
//! Configuration assembly only ever asks the platform one question: what is
//! at this path? The `Runtime` trait answers it. `NativeRuntime` consults the
//! real filesystem; `MemoryRuntime` serves a fixed in-memory tree, which is
//! what tests and embedders without disk access use.

mod memory;
mod native;

pub use memory::MemoryRuntime;
pub use native::NativeRuntime;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Nothing exists at the path
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// File metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
}

impl FileMetadata {
    pub const DIRECTORY: Self = Self {
        is_dir: true,
        is_file: false,
    };

    pub const FILE: Self = Self {
        is_dir: false,
        is_file: true,
    };
}

/// Platform runtime trait
///
/// Implementations must report a path that does not exist as
/// [`RuntimeError::FileNotFound`]; callers rely on that variant to tell
/// "absent" apart from a failing status query.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Get file metadata
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;
}
