//! Project root validation.

use std::path::{Path, PathBuf};

use crate::error::{BuildpackError, Result};
use crate::runtime::{Runtime, RuntimeError};

/// Confirm that `context` names an existing directory.
///
/// A failing status query counts as "does not exist", which is fatal for the
/// root and reported as [`BuildpackError::NotADirectory`].
pub async fn validate_root(runtime: &dyn Runtime, context: Option<&Path>) -> Result<PathBuf> {
    let context = context.ok_or(BuildpackError::MissingRoot)?;

    match runtime.metadata(context).await {
        Ok(metadata) if metadata.is_dir => {
            tracing::debug!("Validated project root {}", context.display());
            Ok(context.to_path_buf())
        }
        Ok(_) => Err(BuildpackError::NotADirectory(context.to_path_buf())),
        Err(err) => {
            tracing::debug!("Status query for {} failed: {}", context.display(), err);
            Err(BuildpackError::NotADirectory(context.to_path_buf()))
        }
    }
}

/// Check for an optional file whose absence is not an error.
///
/// Returns `false` when nothing is at `path` or when it is not a regular file.
/// Status failures other than not-found still propagate.
pub async fn probe_optional_file(runtime: &dyn Runtime, path: &Path) -> Result<bool> {
    match runtime.metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file),
        Err(RuntimeError::FileNotFound(_)) => {
            tracing::trace!("Optional file {} not present", path.display());
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;

    #[tokio::test]
    async fn missing_context_fails() {
        let runtime = MemoryRuntime::new("/");
        let err = validate_root(&runtime, None).await.unwrap_err();
        assert!(matches!(err, BuildpackError::MissingRoot));
        assert!(err.to_string().contains("root directory"));
    }

    #[tokio::test]
    async fn file_context_fails() {
        let runtime = MemoryRuntime::new("/").with_file("/app/package.json");
        let err = validate_root(&runtime, Some(Path::new("/app/package.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildpackError::NotADirectory(_)));
        assert!(err.to_string().contains("not a directory"));
    }

    #[tokio::test]
    async fn absent_context_fails() {
        let runtime = MemoryRuntime::new("/");
        let err = validate_root(&runtime, Some(Path::new("/nowhere")))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildpackError::NotADirectory(_)));
    }

    #[tokio::test]
    async fn directory_context_is_returned() {
        let runtime = MemoryRuntime::new("/").with_dir("/app");
        let root = validate_root(&runtime, Some(Path::new("/app"))).await.unwrap();
        assert_eq!(root, PathBuf::from("/app"));
    }

    #[tokio::test]
    async fn optional_file_absence_is_not_fatal() {
        let runtime = MemoryRuntime::new("/").with_file("/app/babel.config.js");
        assert!(probe_optional_file(&runtime, Path::new("/app/babel.config.js"))
            .await
            .unwrap());
        assert!(!probe_optional_file(&runtime, Path::new("/app/missing.js"))
            .await
            .unwrap());
        // A directory at the path is not the file we are looking for
        assert!(!probe_optional_file(&runtime, Path::new("/app")).await.unwrap());
    }
}
