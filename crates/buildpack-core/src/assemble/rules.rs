use serde_json::json;
use std::path::{Path, PathBuf};

use super::types::{AssetCategory, ModuleRule, RuleUse};
use crate::environment::Mode;
use crate::features::FlaggedDirs;

/// Inputs the module rules depend on
pub(crate) struct RuleInputs<'a> {
    pub src: &'a Path,
    pub mode: Mode,
    pub dirs: &'a FlaggedDirs,
    /// Project transform config, when present
    pub transform_config: Option<&'a Path>,
}

fn scoped(src: &Path, vendor_dirs: &[PathBuf]) -> Vec<PathBuf> {
    std::iter::once(src.to_path_buf())
        .chain(vendor_dirs.iter().cloned())
        .collect()
}

/// One rule per asset category, queries first
pub(crate) fn module_rules(inputs: &RuleInputs<'_>) -> Vec<ModuleRule> {
    let RuleInputs {
        src,
        mode,
        dirs,
        transform_config,
    } = *inputs;

    let css_module_dirs = scoped(src, &dirs.css_modules);

    let script_options = match transform_config {
        Some(config_file) => json!({
            "envName": mode.as_str(),
            "rootMode": "root",
            "configFile": config_file,
        }),
        None => json!({
            "envName": mode.as_str(),
            "rootMode": "upward",
        }),
    };

    let local_ident_name = match mode {
        Mode::Production => "[local]-[hash:base64:3]",
        Mode::Development => "[name]-[local]-[hash:base64:3]",
    };

    vec![
        ModuleRule {
            category: AssetCategory::Queries,
            test: r"\.graphql$".to_string(),
            include: scoped(src, &dirs.graphql_queries),
            exclude: Vec::new(),
            uses: vec![RuleUse::loader("graphql-tag/loader")],
        },
        ModuleRule {
            category: AssetCategory::Scripts,
            test: r"\.(mjs|js|jsx|ts|tsx)$".to_string(),
            include: scoped(src, &dirs.es_modules),
            exclude: Vec::new(),
            uses: vec![RuleUse::with_options("babel-loader", script_options)],
        },
        ModuleRule {
            category: AssetCategory::StyleModules,
            test: r"\.css$".to_string(),
            include: css_module_dirs.clone(),
            exclude: Vec::new(),
            uses: vec![
                RuleUse::loader("style-loader"),
                RuleUse::with_options(
                    "css-loader",
                    json!({
                        "modules": { "localIdentName": local_ident_name },
                        "importLoaders": 1,
                    }),
                ),
            ],
        },
        ModuleRule {
            category: AssetCategory::GlobalStyles,
            test: r"\.css$".to_string(),
            include: Vec::new(),
            exclude: css_module_dirs,
            uses: vec![
                RuleUse::loader("style-loader"),
                RuleUse::with_options("css-loader", json!({ "modules": false })),
            ],
        },
        ModuleRule {
            category: AssetCategory::Markup,
            test: r"\.html$".to_string(),
            include: vec![src.to_path_buf()],
            exclude: Vec::new(),
            uses: vec![RuleUse::loader("html-loader")],
        },
        ModuleRule {
            category: AssetCategory::Files,
            test: r"\.(jpg|jpeg|png|gif|svg|webp|woff2?)$".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            uses: vec![RuleUse::with_options(
                "file-loader",
                json!({ "name": "[name]-[hash:base58:3].[ext]" }),
            )],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(dirs: &FlaggedDirs, transform_config: Option<&Path>) -> Vec<ModuleRule> {
        module_rules(&RuleInputs {
            src: Path::new("/app/src"),
            mode: Mode::Development,
            dirs,
            transform_config,
        })
    }

    #[test]
    fn one_rule_per_category() {
        let rules = rules(&FlaggedDirs::default(), None);
        assert_eq!(rules.len(), 6);
        for rule in &rules {
            regex::Regex::new(&rule.test).unwrap();
        }
    }

    #[test]
    fn style_modules_and_globals_partition_css() {
        let dirs = FlaggedDirs {
            css_modules: vec![PathBuf::from("/app/node_modules/venia")],
            ..FlaggedDirs::default()
        };
        let rules = rules(&dirs, None);
        let modules = rules
            .iter()
            .find(|r| r.category == AssetCategory::StyleModules)
            .unwrap();
        let globals = rules
            .iter()
            .find(|r| r.category == AssetCategory::GlobalStyles)
            .unwrap();

        assert_eq!(modules.include, globals.exclude);
        assert_eq!(modules.include.len(), 2);
    }

    #[test]
    fn transform_config_switches_root_mode() {
        let without = rules(&FlaggedDirs::default(), None);
        assert_eq!(without[1].uses[0].options["rootMode"], "upward");

        let config = Path::new("/app/babel.config.js");
        let with = rules(&FlaggedDirs::default(), Some(config));
        assert_eq!(with[1].uses[0].options["rootMode"], "root");
        assert_eq!(with[1].uses[0].options["configFile"], "/app/babel.config.js");
        assert_eq!(with[1].uses[0].options["envName"], "development");
    }
}
