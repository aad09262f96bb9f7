use async_trait::async_trait;
use path_clean::PathClean;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Runtime serving a fixed in-memory tree
///
/// Paths are normalized before storage and lookup, so `./app/src` and
/// `app/src` name the same entry. Adding a path also registers its ancestors
/// as directories.
#[derive(Debug, Clone)]
pub struct MemoryRuntime {
    entries: HashMap<PathBuf, FileMetadata>,
    cwd: PathBuf,
}

impl MemoryRuntime {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            entries: HashMap::new(),
            cwd: cwd.into(),
        }
    }

    /// Register a directory (and its ancestors)
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), FileMetadata::DIRECTORY);
        self
    }

    /// Register a file (its ancestors become directories)
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), FileMetadata::FILE);
        self
    }

    fn insert(&mut self, path: &Path, metadata: FileMetadata) {
        let normalized = self.normalize_for_lookup(path);
        for ancestor in normalized.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.entries
                .entry(ancestor.to_path_buf())
                .or_insert(FileMetadata::DIRECTORY);
        }
        self.entries.insert(normalized, metadata);
    }

    fn normalize_for_lookup(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.cwd.join(path).clean()
        }
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let normalized = self.normalize_for_lookup(path);
        self.entries
            .get(&normalized)
            .copied()
            .ok_or(RuntimeError::FileNotFound(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn normalizes_relative_paths() {
        let runtime = MemoryRuntime::new("/work").with_file("app/src/index.js");

        assert_eq!(
            runtime.metadata(Path::new("./app/src/index.js")).await.unwrap(),
            FileMetadata::FILE
        );
        assert_eq!(
            runtime.metadata(Path::new("/work/app")).await.unwrap(),
            FileMetadata::DIRECTORY
        );
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let runtime = MemoryRuntime::new("/work").with_dir("app");
        let err = runtime.metadata(Path::new("other")).await.unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(p) if p == Path::new("/work/other")));
    }
}
