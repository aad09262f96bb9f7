//! Asset manifest classification
//!
//! After compilation the bundler writes an asset manifest: the entrypoints
//! with their script files, plus one key per source asset mapping to its
//! compiled file or files. [`ManifestClassifier`] sorts those files into the
//! groups the client shell needs:
//!
//! - `bundles.load`: entrypoint scripts, required at startup
//! - `bundles.prefetch`: root-component chunks, fetched opportunistically
//! - `js`: root-component base name to its compiled file(s)
//!
//! Keys that are not root components (images, stylesheets, plain scripts)
//! stay in the manifest untouched and land in neither group.

mod convention;

pub use convention::{AssetNamingConvention, PatternConvention, RootComponentConvention};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A compiled output reference: one file or an ordered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetValue {
    Single(String),
    Many(Vec<String>),
}

impl AssetValue {
    pub fn files(&self) -> &[String] {
        match self {
            AssetValue::Single(file) => std::slice::from_ref(file),
            AssetValue::Many(files) => files,
        }
    }
}

impl From<&str> for AssetValue {
    fn from(file: &str) -> Self {
        AssetValue::Single(file.to_string())
    }
}

impl From<Vec<&str>> for AssetValue {
    fn from(files: Vec<&str>) -> Self {
        AssetValue::Many(files.into_iter().map(String::from).collect())
    }
}

/// Files of one entrypoint bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrypoint {
    #[serde(default)]
    pub js: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<String>,
}

/// Load-order groups written by the classifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundles {
    pub load: Vec<String>,
    pub prefetch: Vec<String>,
}

/// The bundler's asset manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub entrypoints: IndexMap<String, Entrypoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundles: Option<Bundles>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js: Option<IndexMap<String, AssetValue>>,

    /// Every other key, in the order the bundler emitted them
    #[serde(flatten)]
    pub assets: IndexMap<String, AssetValue>,
}

impl AssetManifest {
    pub fn with_entrypoint(mut self, name: impl Into<String>, js: Vec<&str>) -> Self {
        self.entrypoints.insert(
            name.into(),
            Entrypoint {
                js: js.into_iter().map(String::from).collect(),
                css: Vec::new(),
            },
        );
        self
    }

    pub fn with_asset(mut self, key: impl Into<String>, value: impl Into<AssetValue>) -> Self {
        self.assets.insert(key.into(), value.into());
        self
    }
}

/// Manifest transform handed to the asset-manifest plugin
#[derive(Clone)]
pub struct ManifestClassifier {
    convention: Arc<dyn AssetNamingConvention>,
}

impl ManifestClassifier {
    pub fn new(convention: Arc<dyn AssetNamingConvention>) -> Self {
        Self { convention }
    }

    /// Classify `manifest` in place.
    ///
    /// The bundler invokes the transform exactly once per manifest.
    pub fn classify(&self, manifest: &mut AssetManifest) {
        debug_assert!(
            manifest.bundles.is_none(),
            "asset manifest was already classified"
        );

        let load: Vec<String> = manifest
            .entrypoints
            .values()
            .flat_map(|entrypoint| entrypoint.js.iter().cloned())
            .collect();

        let mut prefetch = Vec::new();
        let mut js = IndexMap::new();
        for (key, value) in &manifest.assets {
            let Some(base) = self.convention.root_component_base(key) else {
                continue;
            };
            prefetch.extend(value.files().iter().cloned());
            js.insert(base.to_string(), value.clone());
        }

        tracing::debug!(
            "Classified manifest: {} load, {} prefetch, {} root components",
            load.len(),
            prefetch.len(),
            js.len()
        );

        manifest.bundles = Some(Bundles { load, prefetch });
        manifest.js = Some(js);
    }
}

impl Default for ManifestClassifier {
    fn default() -> Self {
        Self::new(Arc::new(RootComponentConvention::default()))
    }
}

impl fmt::Debug for ManifestClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestClassifier")
            .field("convention", &self.convention)
            .finish()
    }
}
