use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Runtime backed by the host filesystem
///
/// Relative paths are resolved against the working directory given at
/// construction.
#[derive(Debug, Clone)]
pub struct NativeRuntime {
    cwd: PathBuf,
}

impl NativeRuntime {
    /// Create a new NativeRuntime with the given working directory
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let path = self.resolve_path(path);

        tokio::task::spawn_blocking(move || {
            let metadata = std::fs::metadata(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RuntimeError::FileNotFound(path.clone())
                } else {
                    RuntimeError::Io(format!(
                        "Failed to get metadata for {}: {}",
                        path.display(),
                        e
                    ))
                }
            })?;

            Ok(FileMetadata {
                is_dir: metadata.is_dir(),
                is_file: metadata.is_file(),
            })
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }
}
