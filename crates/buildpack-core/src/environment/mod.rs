//! Environment and build mode resolution
//!
//! The environment itself comes from an [`EnvironmentLoader`]. This module
//! reconciles what the loader reports with an explicit mode override and
//! produces the [`ResolvedEnvironment`] the rest of the pipeline reads.

mod figment_loader;

pub use figment_loader::FigmentEnvironmentLoader;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{BuildpackError, Result};

/// Build mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Production,
    Development,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Production => "production",
            Mode::Development => "development",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl FromStr for Mode {
    type Err = BuildpackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "production" => Ok(Mode::Production),
            "development" => Ok(Mode::Development),
            other => Err(BuildpackError::UnrecognizedMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit overrides supplied with a configuration request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvOverrides {
    /// Raw mode literal, validated during resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl EnvOverrides {
    pub fn mode(mode: impl Into<String>) -> Self {
        Self {
            mode: Some(mode.into()),
        }
    }
}

/// Named configuration sections reported by the environment loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sections(IndexMap<String, Value>);

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Raw section value
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Section value deserialized into `T`; `None` when absent or mistyped
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.section(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<IndexMap<String, Value>> for Sections {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

/// What an environment loader reports for a project
#[derive(Debug, Clone, Default)]
pub struct LoadedEnvironment {
    pub sections: Sections,
    pub is_prod: bool,
}

/// Failure reported by an environment loader; the message is kept verbatim
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct EnvironmentLoadError {
    message: String,
}

impl EnvironmentLoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Environment-loading service
#[async_trait]
pub trait EnvironmentLoader: Send + Sync + fmt::Debug {
    async fn load(
        &self,
        context: &Path,
        overrides: &EnvOverrides,
    ) -> std::result::Result<LoadedEnvironment, EnvironmentLoadError>;
}

/// Environment after mode reconciliation; immutable for the rest of a request
#[derive(Debug, Clone)]
pub struct ResolvedEnvironment {
    pub mode: Mode,
    pub sections: Sections,
    pub is_production: bool,
}

/// Load the environment for `context` and settle the build mode.
///
/// The loader runs first, so an invalid environment is reported even when the
/// override is also bad. An explicit override wins over the loader's
/// production flag.
pub async fn resolve_environment(
    loader: &dyn EnvironmentLoader,
    context: &Path,
    overrides: &EnvOverrides,
) -> Result<ResolvedEnvironment> {
    let loaded = loader
        .load(context, overrides)
        .await
        .map_err(|err| BuildpackError::InvalidEnvironment(err.message))?;

    let mode = match overrides.mode.as_deref() {
        Some(literal) => literal.parse::<Mode>()?,
        None if loaded.is_prod => Mode::Production,
        None => Mode::Development,
    };

    tracing::debug!(
        "Resolved {} mode ({} sections)",
        mode,
        loaded.sections.keys().count()
    );

    Ok(ResolvedEnvironment {
        mode,
        is_production: mode.is_production(),
        sections: loaded.sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct FixedLoader(std::result::Result<LoadedEnvironment, EnvironmentLoadError>);

    #[async_trait]
    impl EnvironmentLoader for FixedLoader {
        async fn load(
            &self,
            _context: &Path,
            _overrides: &EnvOverrides,
        ) -> std::result::Result<LoadedEnvironment, EnvironmentLoadError> {
            self.0.clone()
        }
    }

    fn env(is_prod: bool) -> FixedLoader {
        FixedLoader(Ok(LoadedEnvironment {
            sections: Sections::new().with("devServer", json!({ "serviceWorkerEnabled": is_prod })),
            is_prod,
        }))
    }

    #[test]
    fn mode_parses_known_literals_only() {
        assert_eq!("production".parse::<Mode>().unwrap(), Mode::Production);
        assert_eq!("development".parse::<Mode>().unwrap(), Mode::Development);
        let err = "Production".parse::<Mode>().unwrap_err();
        assert!(matches!(err, BuildpackError::UnrecognizedMode(ref v) if v == "Production"));
    }

    #[tokio::test]
    async fn falls_back_to_loader_flag() {
        let resolved = resolve_environment(&env(true), Path::new("."), &EnvOverrides::default())
            .await
            .unwrap();
        assert_eq!(resolved.mode, Mode::Production);
        assert!(resolved.is_production);

        let resolved = resolve_environment(&env(false), Path::new("."), &EnvOverrides::default())
            .await
            .unwrap();
        assert_eq!(resolved.mode, Mode::Development);
    }

    #[tokio::test]
    async fn override_wins_over_loader() {
        let resolved = resolve_environment(
            &env(true),
            Path::new("."),
            &EnvOverrides::mode("development"),
        )
        .await
        .unwrap();
        assert_eq!(resolved.mode, Mode::Development);
        assert!(!resolved.is_production);
        assert_eq!(
            resolved.sections.get::<serde_json::Value>("devServer"),
            Some(json!({ "serviceWorkerEnabled": true }))
        );
    }

    #[tokio::test]
    async fn unrecognized_override_names_the_value() {
        let err = resolve_environment(&env(true), Path::new("."), &EnvOverrides::mode("wuh"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildpackError::UnrecognizedMode(_)));
        assert!(err.to_string().contains("wuh"));
    }

    #[tokio::test]
    async fn loader_error_keeps_message_and_wins() {
        let loader = FixedLoader(Err(EnvironmentLoadError::new(
            "Configuration foo was invalid",
        )));
        let err = resolve_environment(&loader, Path::new("."), &EnvOverrides::mode("wuh"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildpackError::InvalidEnvironment(_)));
        assert!(err.to_string().contains("foo was invalid"));
    }
}
