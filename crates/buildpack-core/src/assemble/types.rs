//! Assembled configuration types.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::environment::Mode;
use crate::manifest::ManifestClassifier;

/// Complete bundler configuration for the client build
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    pub mode: Mode,
    pub context: PathBuf,
    pub entry: IndexMap<String, PathBuf>,
    pub output: OutputOptions,
    pub module_rules: Vec<ModuleRule>,
    pub optimization: Optimization,
    pub plugins: Vec<PluginSpec>,
    pub devtool: String,

    /// Transform the asset-manifest plugin runs once after compilation
    #[serde(skip)]
    pub manifest_transform: ManifestClassifier,
}

impl BuildConfiguration {
    /// First rule handling `category`
    pub fn rule(&self, category: AssetCategory) -> Option<&ModuleRule> {
        self.module_rules.iter().find(|rule| rule.category == category)
    }

    /// First rule using a loader whose name starts with `loader`
    pub fn rule_using(&self, loader: &str) -> Option<&ModuleRule> {
        self.module_rules
            .iter()
            .find(|rule| rule.uses.iter().any(|u| u.loader.starts_with(loader)))
    }

    pub fn root_components_plugin(&self) -> Option<&RootComponentsOptions> {
        self.plugins.iter().find_map(|plugin| match plugin {
            PluginSpec::RootComponents(options) => Some(options),
            _ => None,
        })
    }

    pub fn assets_manifest_plugin(&self) -> Option<&AssetsManifestOptions> {
        self.plugins.iter().find_map(|plugin| match plugin {
            PluginSpec::AssetsManifest(options) => Some(options),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub path: PathBuf,
    pub public_path: String,
    pub filename: String,
    pub chunk_filename: String,
}

/// Kinds of source assets the build knows how to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    Queries,
    Scripts,
    StyleModules,
    GlobalStyles,
    Markup,
    Files,
}

/// One module transformation rule
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRule {
    pub category: AssetCategory,
    /// Regular expression source matched against module paths
    pub test: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<PathBuf>,
    #[serde(rename = "use")]
    pub uses: Vec<RuleUse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleUse {
    pub loader: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

impl RuleUse {
    pub fn loader(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(loader: impl Into<String>, options: Value) -> Self {
        Self {
            loader: loader.into(),
            options,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleIds {
    Named,
    Hashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkScope {
    All,
    Async,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
    pub test: String,
    pub name: String,
    pub chunks: ChunkScope,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChunks {
    pub chunks: ChunkScope,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub cache_groups: IndexMap<String, CacheGroup>,
}

/// Optimization settings; always present, contents vary by mode
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    pub minimize: bool,
    pub module_ids: ModuleIds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_chunk: Option<String>,
    pub split_chunks: SplitChunks,
}

/// Plugins, described by their constructor arguments
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "plugin", rename_all = "kebab-case")]
pub enum PluginSpec {
    Define {
        definitions: IndexMap<String, String>,
    },
    RootComponents(RootComponentsOptions),
    UpwardInclude {
        #[serde(rename = "upwardDirs")]
        upward_dirs: Vec<PathBuf>,
    },
    AssetsManifest(AssetsManifestOptions),
    ServiceWorker(ServiceWorkerOptions),
    HotModuleReplacement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootComponentsOptions {
    pub root_components_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetsManifestOptions {
    pub output: String,
    pub entrypoints: bool,
    pub public_path: bool,
    pub write_to_disk: bool,
    #[serde(skip)]
    pub transform: ManifestClassifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWorkerOptions {
    pub sw_src: PathBuf,
    pub sw_dest: String,
    /// Serve the worker from the dev server instead of only in production
    pub enable_in_development: bool,
}
