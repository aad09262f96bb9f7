//! Configuration assembly pipeline
//!
//! [`Configurator`] holds the injected services and turns a
//! [`ConfigurationRequest`] into a [`BuildConfiguration`]:
//!
//! 1. validate the project root
//! 2. load the environment and settle the mode
//! 3. attach vendor extensions to a fresh [`BuildBus`]
//! 4. dispatch `specialFeatures` once per vendor
//! 5. build rules, plugins and optimization from the resolved flags
//!
//! Any failure aborts the request; no partial configuration is returned.

mod optimization;
mod rules;
mod types;

pub use types::*;

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bus::{BuildBus, ExtensionResolver, StaticResolver};
use crate::environment::{
    EnvironmentLoader, Mode, ResolvedEnvironment, Sections, resolve_environment,
};
use crate::error::Result;
use crate::features::FlaggedDirs;
use crate::manifest::{AssetNamingConvention, ManifestClassifier};
use crate::request::ConfigurationRequest;
use crate::root::{probe_optional_file, validate_root};
use crate::runtime::Runtime;

use self::rules::RuleInputs;

/// Project transform config probed next to the project root
pub const TRANSFORM_CONFIG: &str = "babel.config.js";

/// Manifest file written by the asset-manifest plugin
pub const ASSET_MANIFEST: &str = "asset-manifest.json";

/// Section controlling the development server
pub const DEV_SERVER_SECTION: &str = "dev_server";

/// Spelling of [`DEV_SERVER_SECTION`] used by camelCase loaders
pub const DEV_SERVER_SECTION_ALIAS: &str = "devServer";

#[derive(Debug, Default, Deserialize)]
struct DevServerSection {
    #[serde(default, alias = "serviceWorkerEnabled")]
    service_worker_enabled: bool,
}

/// Assembles build configurations against injected services
#[derive(Debug, Clone)]
pub struct Configurator {
    runtime: Arc<dyn Runtime>,
    environment: Arc<dyn EnvironmentLoader>,
    extensions: Arc<dyn ExtensionResolver>,
    classifier: ManifestClassifier,
}

impl Configurator {
    pub fn new(runtime: Arc<dyn Runtime>, environment: Arc<dyn EnvironmentLoader>) -> Self {
        Self {
            runtime,
            environment,
            extensions: Arc::new(StaticResolver::new()),
            classifier: ManifestClassifier::default(),
        }
    }

    /// Extension discovery used for every request
    pub fn extensions(mut self, resolver: Arc<dyn ExtensionResolver>) -> Self {
        self.extensions = resolver;
        self
    }

    /// Naming convention the manifest transform recognizes root components by
    pub fn naming_convention(mut self, convention: Arc<dyn AssetNamingConvention>) -> Self {
        self.classifier = ManifestClassifier::new(convention);
        self
    }

    /// Assemble the configuration for `request`.
    ///
    /// # Errors
    ///
    /// Returns the first failure of root validation, environment loading,
    /// mode parsing or an extension contribution.
    pub async fn configure(&self, request: &ConfigurationRequest) -> Result<BuildConfiguration> {
        let context = validate_root(self.runtime.as_ref(), request.context.as_deref()).await?;
        let env =
            resolve_environment(self.environment.as_ref(), &context, &request.env).await?;

        let bus = BuildBus::attach(self.extensions.as_ref(), &request.vendor)?;
        let groups = bus.dispatch_special_features(&request.vendor, &request.special)?;

        let mut dirs = FlaggedDirs::default();
        for group in &groups {
            dirs.add(self.extensions.package_dir(&context, &group.vendor), &group.flags);
        }

        let transform_config = context.join(TRANSFORM_CONFIG);
        let has_transform_config =
            probe_optional_file(self.runtime.as_ref(), &transform_config).await?;
        if !has_transform_config {
            tracing::debug!(
                "No {} in {}, scripts resolve their config upward",
                TRANSFORM_CONFIG,
                context.display()
            );
        }

        let src = context.join("src");
        let module_rules = rules::module_rules(&RuleInputs {
            src: &src,
            mode: env.mode,
            dirs: &dirs,
            transform_config: has_transform_config.then_some(transform_config.as_path()),
        });

        let config = BuildConfiguration {
            mode: env.mode,
            entry: IndexMap::from([("client".to_string(), src.join("index.js"))]),
            output: output_options(&context, env.mode),
            module_rules,
            optimization: optimization::optimization(env.mode, &request.vendor),
            plugins: self.plugins(&context, &env, &dirs),
            devtool: match env.mode {
                Mode::Production => "source-map",
                Mode::Development => "eval-source-map",
            }
            .to_string(),
            manifest_transform: self.classifier.clone(),
            context,
        };

        tracing::debug!(
            "Assembled {} configuration: {} rules, {} plugins",
            config.mode,
            config.module_rules.len(),
            config.plugins.len()
        );

        Ok(config)
    }

    fn plugins(
        &self,
        context: &Path,
        env: &ResolvedEnvironment,
        dirs: &FlaggedDirs,
    ) -> Vec<PluginSpec> {
        let mut plugins = vec![PluginSpec::Define {
            definitions: IndexMap::from([
                (
                    "process.env.NODE_ENV".to_string(),
                    format!("\"{}\"", env.mode),
                ),
                ("__DEV__".to_string(), (!env.is_production).to_string()),
            ]),
        }];

        if !dirs.root_components.is_empty() {
            plugins.push(PluginSpec::RootComponents(RootComponentsOptions {
                root_components_dirs: dirs.root_components.clone(),
            }));
        }

        plugins.push(PluginSpec::UpwardInclude {
            upward_dirs: std::iter::once(context.to_path_buf())
                .chain(dirs.upward.iter().cloned())
                .collect(),
        });

        plugins.push(PluginSpec::AssetsManifest(AssetsManifestOptions {
            output: ASSET_MANIFEST.to_string(),
            entrypoints: true,
            public_path: true,
            write_to_disk: true,
            transform: self.classifier.clone(),
        }));

        let dev_server = dev_server_section(&env.sections);
        if env.is_production || dev_server.service_worker_enabled {
            plugins.push(PluginSpec::ServiceWorker(ServiceWorkerOptions {
                sw_src: context.join("src").join("sw.js"),
                sw_dest: "sw.js".to_string(),
                enable_in_development: dev_server.service_worker_enabled,
            }));
        }

        if !env.is_production {
            plugins.push(PluginSpec::HotModuleReplacement);
        }

        plugins
    }
}

fn dev_server_section(sections: &Sections) -> DevServerSection {
    let key = if sections.contains(DEV_SERVER_SECTION) {
        DEV_SERVER_SECTION
    } else {
        DEV_SERVER_SECTION_ALIAS
    };
    sections.get(key).unwrap_or_default()
}

fn output_options(context: &Path, mode: Mode) -> OutputOptions {
    let (filename, chunk_filename) = match mode {
        Mode::Production => ("[name].[contenthash].js", "[name].[chunkhash].js"),
        Mode::Development => ("[name].js", "[name].chunk.js"),
    };

    OutputOptions {
        path: PathBuf::from(context).join("dist"),
        public_path: "/".to_string(),
        filename: filename.to_string(),
        chunk_filename: chunk_filename.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_hashes_only_in_production() {
        let prod = output_options(Path::new("/app"), Mode::Production);
        let dev = output_options(Path::new("/app"), Mode::Development);
        assert_eq!(prod.path, PathBuf::from("/app/dist"));
        assert!(prod.filename.contains("[contenthash]"));
        assert_eq!(dev.filename, "[name].js");
        assert_eq!(dev.public_path, "/");
    }

    #[test]
    fn dev_server_section_accepts_both_spellings() {
        let snake: DevServerSection =
            serde_json::from_value(serde_json::json!({ "service_worker_enabled": true })).unwrap();
        let camel: DevServerSection =
            serde_json::from_value(serde_json::json!({ "serviceWorkerEnabled": true })).unwrap();
        assert!(snake.service_worker_enabled);
        assert!(camel.service_worker_enabled);
    }

    #[test]
    fn dev_server_section_falls_back_to_camel_case_key() {
        let camel = Sections::new().with("devServer", json!({ "serviceWorkerEnabled": true }));
        assert!(dev_server_section(&camel).service_worker_enabled);

        let both = Sections::new()
            .with("dev_server", json!({ "service_worker_enabled": false }))
            .with("devServer", json!({ "serviceWorkerEnabled": true }));
        assert!(!dev_server_section(&both).service_worker_enabled);

        assert!(!dev_server_section(&Sections::new()).service_worker_enabled);
    }
}
