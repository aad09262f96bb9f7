//! Per-vendor special feature flags.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ordered map of vendor name to its feature flags
pub type SpecialFlags = IndexMap<String, FeatureFlags>;

/// Build-time toggles a vendor package can opt into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    /// Compile the package's CSS as CSS modules
    pub css_modules: bool,
    /// Transpile the package's ES modules with the project's script loader
    pub es_modules: bool,
    /// Load `.graphql` query documents from the package
    pub graphql_queries: bool,
    /// Scan the package for root components
    pub root_components: bool,
    /// Let the package contribute upward resolution files
    pub upward: bool,
    /// Collect translation files from the package
    pub i18n: bool,
}

impl FeatureFlags {
    pub fn all() -> Self {
        Self {
            css_modules: true,
            es_modules: true,
            graphql_queries: true,
            root_components: true,
            upward: true,
            i18n: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Payload of one `specialFeatures` dispatch: a single vendor's flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureGroup {
    pub vendor: String,
    pub flags: FeatureFlags,
}

impl FeatureGroup {
    pub fn new(vendor: impl Into<String>, flags: FeatureFlags) -> Self {
        Self {
            vendor: vendor.into(),
            flags,
        }
    }
}

/// Package directories collected per flag after dispatch, in vendor order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlaggedDirs {
    pub css_modules: Vec<PathBuf>,
    pub es_modules: Vec<PathBuf>,
    pub graphql_queries: Vec<PathBuf>,
    pub root_components: Vec<PathBuf>,
    pub upward: Vec<PathBuf>,
    pub i18n: Vec<PathBuf>,
}

impl FlaggedDirs {
    /// Record `dir` under every flag enabled in `flags`
    pub fn add(&mut self, dir: PathBuf, flags: &FeatureFlags) {
        let slots = [
            (flags.css_modules, &mut self.css_modules),
            (flags.es_modules, &mut self.es_modules),
            (flags.graphql_queries, &mut self.graphql_queries),
            (flags.root_components, &mut self.root_components),
            (flags.upward, &mut self.upward),
            (flags.i18n, &mut self.i18n),
        ];
        for (enabled, dirs) in slots {
            if enabled {
                dirs.push(dir.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flags_deserialize_camel_case_with_defaults() {
        let flags: FeatureFlags =
            serde_json::from_value(json!({ "graphqlQueries": true, "rootComponents": true }))
                .unwrap();
        assert!(flags.graphql_queries);
        assert!(flags.root_components);
        assert!(!flags.css_modules);
        assert!(!flags.upward);
    }

    #[test]
    fn flagged_dirs_only_collect_enabled_flags() {
        let mut dirs = FlaggedDirs::default();
        let flags = FeatureFlags {
            graphql_queries: true,
            ..FeatureFlags::default()
        };
        dirs.add(PathBuf::from("node_modules/a"), &flags);
        dirs.add(PathBuf::from("node_modules/b"), &FeatureFlags::all());

        assert_eq!(dirs.graphql_queries.len(), 2);
        assert_eq!(dirs.root_components, vec![PathBuf::from("node_modules/b")]);
    }
}
