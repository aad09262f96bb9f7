use regex::Regex;
use std::fmt;

/// Decides which manifest keys name root-component chunks
pub trait AssetNamingConvention: Send + Sync + fmt::Debug {
    /// Base identifier for a root-component key, or `None` for any other key
    fn root_component_base<'a>(&self, key: &'a str) -> Option<&'a str>;
}

/// Prefix/suffix convention: `RootCmp-Foo.js` has base `RootCmp-Foo`
///
/// A key matches when it ends with `suffix` and what remains starts with
/// `prefix` and is longer than it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootComponentConvention {
    prefix: String,
    suffix: String,
}

impl RootComponentConvention {
    pub const DEFAULT_PREFIX: &'static str = "RootCmp";
    pub const DEFAULT_SUFFIX: &'static str = ".js";

    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

impl Default for RootComponentConvention {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX, Self::DEFAULT_SUFFIX)
    }
}

impl AssetNamingConvention for RootComponentConvention {
    fn root_component_base<'a>(&self, key: &'a str) -> Option<&'a str> {
        let base = key.strip_suffix(self.suffix.as_str())?;
        (base.len() > self.prefix.len() && base.starts_with(self.prefix.as_str())).then_some(base)
    }
}

/// Regex convention; the `base` capture group is the identifier
#[derive(Debug, Clone)]
pub struct PatternConvention {
    pattern: Regex,
}

impl PatternConvention {
    /// Compile `pattern`; it must define a capture group named `base`
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern)?;
        if !pattern.capture_names().any(|name| name == Some("base")) {
            return Err(regex::Error::Syntax(
                "pattern must define a capture group named `base`".to_string(),
            ));
        }
        Ok(Self { pattern })
    }
}

impl AssetNamingConvention for PatternConvention {
    fn root_component_base<'a>(&self, key: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(key)
            .and_then(|captures| captures.name("base"))
            .map(|base| base.as_str())
    }
}
