//! Configuration request: the immutable input of assembly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::environment::EnvOverrides;
use crate::error::{BuildpackError, Result};
use crate::features::{FeatureFlags, SpecialFlags};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRequest {
    /// Project root; every other path is resolved from here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,

    #[serde(default)]
    pub env: EnvOverrides,

    /// Vendor packages, in extension discovery order
    #[serde(default)]
    pub vendor: Vec<String>,

    /// Feature flags per vendor package
    #[serde(default)]
    pub special: SpecialFlags,
}

impl ConfigurationRequest {
    pub fn new(context: impl Into<PathBuf>) -> Self {
        Self {
            context: Some(context.into()),
            ..Self::default()
        }
    }

    /// Create from serde_json::Value (for programmatic requests)
    ///
    /// # Example
    ///
    /// ```
    /// use buildpack_core::ConfigurationRequest;
    /// use serde_json::json;
    ///
    /// let request = ConfigurationRequest::from_value(json!({
    ///     "context": ".",
    ///     "vendor": ["@magento/venia-ui"],
    ///     "special": { "@magento/venia-ui": { "rootComponents": true } }
    /// }))
    /// .unwrap();
    /// assert!(request.special["@magento/venia-ui"].root_components);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| BuildpackError::InvalidRequest(e.to_string()))
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.env.mode = Some(mode.into());
        self
    }

    pub fn vendor(mut self, name: impl Into<String>) -> Self {
        self.vendor.push(name.into());
        self
    }

    pub fn special(mut self, vendor: impl Into<String>, flags: FeatureFlags) -> Self {
        self.special.insert(vendor.into(), flags);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_keeps_special_order() {
        let request = ConfigurationRequest::from_value(json!({
            "context": "/app",
            "env": { "mode": "development" },
            "special": {
                "zeta": { "upward": true },
                "alpha": { "esModules": true }
            }
        }))
        .unwrap();

        assert_eq!(request.env.mode.as_deref(), Some("development"));
        let keys: Vec<_> = request.special.keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
        assert!(request.special["alpha"].es_modules);
    }

    #[test]
    fn from_value_rejects_mistyped_fields() {
        let err = ConfigurationRequest::from_value(json!({ "vendor": "not-a-list" })).unwrap_err();
        assert!(matches!(err, BuildpackError::InvalidRequest(_)));
    }

    #[test]
    fn builder_collects_fields() {
        let request = ConfigurationRequest::new("/app")
            .mode("production")
            .vendor("venia")
            .special("venia", FeatureFlags::all());
        assert_eq!(request.context, Some(PathBuf::from("/app")));
        assert_eq!(request.vendor, ["venia"]);
        assert!(request.special["venia"].i18n);
    }
}
