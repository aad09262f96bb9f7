//! File-based request discovery for CLI use
//!
//! Finds the configuration request of a project on disk. Library users build
//! a [`ConfigurationRequest`] directly instead.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{BuildpackError, Result};
use crate::request::ConfigurationRequest;

/// Dedicated request file
pub const REQUEST_FILE: &str = "buildpack.toml";

/// Field of `package.json` holding an inline request
pub const PACKAGE_FIELD: &str = "buildpack";

/// Searches a project directory for its configuration request
///
/// # Example
///
/// ```no_run
/// use buildpack_core::RequestDiscovery;
///
/// let request = RequestDiscovery::new(".").load().unwrap();
/// ```
pub struct RequestDiscovery {
    root: PathBuf,
}

impl RequestDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find the request source in the root directory
    ///
    /// Searches in this order:
    /// 1. buildpack.toml
    /// 2. package.json (buildpack field)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join(REQUEST_FILE);
        if toml_path.is_file() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed = serde_json::from_str::<Value>(&content).ok()?;
        match parsed.get(PACKAGE_FIELD) {
            Some(field) if !field.is_null() => Some(pkg_path),
            _ => None,
        }
    }

    /// Load the discovered request.
    ///
    /// A request without `context` is rooted at the discovery directory; a
    /// relative `context` is resolved against it.
    ///
    /// # Errors
    ///
    /// Returns `BuildpackError::RequestNotFound` if neither source exists.
    pub fn load(&self) -> Result<ConfigurationRequest> {
        let path = self
            .find()
            .ok_or_else(|| BuildpackError::RequestNotFound(self.root.clone()))?;
        self.load_file(&path)
    }

    /// Load a request from an explicit file: `package.json`, any other
    /// `.json` file, or TOML.
    ///
    /// `context` is resolved against the discovery root as in [`Self::load`].
    pub fn load_file(&self, path: &Path) -> Result<ConfigurationRequest> {
        tracing::debug!("Loading configuration request from {}", path.display());

        let mut request = if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            self.load_from_package_json(path)?
        } else if path.extension() == Some(std::ffi::OsStr::new("json")) {
            let content = fs::read_to_string(path)?;
            let value = serde_json::from_str(&content).map_err(|e| {
                BuildpackError::InvalidRequest(format!("invalid JSON in {}: {}", path.display(), e))
            })?;
            ConfigurationRequest::from_value(value)?
        } else {
            self.load_from_toml(path)?
        };

        request.context = Some(match request.context.take() {
            Some(context) if context.is_absolute() => context,
            Some(context) => self.root.join(context),
            None => self.root.clone(),
        });

        Ok(request)
    }

    fn load_from_toml(&self, path: &Path) -> Result<ConfigurationRequest> {
        let content = fs::read_to_string(path)?;

        let toml_val: toml::Value = toml::from_str(&content).map_err(|e| {
            BuildpackError::InvalidRequest(format!("invalid TOML in {}: {}", path.display(), e))
        })?;

        let value = serde_json::to_value(toml_val)
            .map_err(|e| BuildpackError::InvalidRequest(format!("TOML to JSON conversion failed: {}", e)))?;

        ConfigurationRequest::from_value(value)
    }

    fn load_from_package_json(&self, path: &Path) -> Result<ConfigurationRequest> {
        let content = fs::read_to_string(path)?;

        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| BuildpackError::InvalidRequest(format!("invalid package.json: {}", e)))?;

        match parsed.get(PACKAGE_FIELD) {
            Some(field) if !field.is_null() => ConfigurationRequest::from_value(field.clone()),
            _ => Err(BuildpackError::InvalidRequest(format!(
                "add a '{}' field to your package.json",
                PACKAGE_FIELD
            ))),
        }
    }
}
