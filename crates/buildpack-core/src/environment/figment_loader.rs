use async_trait::async_trait;
use figment::{
    Figment,
    providers::{Env, Format as _, Toml},
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{EnvOverrides, EnvironmentLoadError, EnvironmentLoader, LoadedEnvironment, Sections};

/// Project-level environment file, looked up in the context directory
pub const ENV_FILE: &str = ".buildpack.toml";

/// Prefix of environment variables mapped onto sections
pub const ENV_PREFIX: &str = "BUILDPACK_";

#[derive(Debug, Deserialize)]
struct RawEnvironment {
    #[serde(default)]
    node_env: Option<String>,

    #[serde(flatten)]
    sections: IndexMap<String, Value>,
}

/// Environment loader built on figment
///
/// Priority (highest first): `BUILDPACK_*` variables (nested with `__`), the
/// raw `NODE_ENV` variable, then `.buildpack.toml` in the project root. The
/// environment counts as production when `node_env` is `production`.
#[derive(Debug, Clone, Default)]
pub struct FigmentEnvironmentLoader {
    required: Vec<String>,
}

impl FigmentEnvironmentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat a missing section as an invalid environment
    pub fn require(mut self, section: impl Into<String>) -> Self {
        self.required.push(section.into());
        self
    }

    fn figment(context: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(context.join(ENV_FILE)))
            .merge(Env::raw().only(&["NODE_ENV"]))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load synchronously; the async trait method runs this off the executor
    pub fn load_blocking(
        &self,
        context: &Path,
    ) -> Result<LoadedEnvironment, EnvironmentLoadError> {
        tracing::trace!("Loading environment for {}", context.display());

        let raw: RawEnvironment = Self::figment(context)
            .extract()
            .map_err(|e| EnvironmentLoadError::new(e.to_string()))?;

        let sections = Sections::from(raw.sections);
        for name in &self.required {
            if !sections.contains(name) {
                return Err(EnvironmentLoadError::new(format!(
                    "missing required section '{}'; set it in {} or via {}{}__*",
                    name,
                    ENV_FILE,
                    ENV_PREFIX,
                    name.to_uppercase()
                )));
            }
        }

        Ok(LoadedEnvironment {
            is_prod: raw.node_env.as_deref() == Some("production"),
            sections,
        })
    }
}

#[async_trait]
impl EnvironmentLoader for FigmentEnvironmentLoader {
    async fn load(
        &self,
        context: &Path,
        _overrides: &EnvOverrides,
    ) -> Result<LoadedEnvironment, EnvironmentLoadError> {
        let loader = self.clone();
        let context: PathBuf = context.to_path_buf();
        tokio::task::spawn_blocking(move || loader.load_blocking(&context))
            .await
            .map_err(|e| EnvironmentLoadError::new(format!("Task join error: {}", e)))?
    }
}
