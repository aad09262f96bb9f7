//! Extension discovery contracts.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ExtensionError, Targets};

/// Which contribution entry point of a vendor package is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    /// Declares targets other extensions can tap
    Declare,
    /// Taps targets declared by any extension
    Intercept,
}

impl Subject {
    /// Naming convention a package uses to advertise this entry point
    pub fn convention(&self) -> &'static str {
        match self {
            Subject::Declare => "buildpack.targets.declare",
            Subject::Intercept => "buildpack.targets.intercept",
        }
    }

    /// Conventional module file name (`declare`, `intercept`)
    pub fn module_stem(&self) -> &'static str {
        match self {
            Subject::Declare => "declare",
            Subject::Intercept => "intercept",
        }
    }
}

/// A discovered contribution module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRegistration {
    pub name: String,
    pub module_path: PathBuf,
}

/// Entry point of a contribution module
pub trait Contribution: Send + Sync {
    fn run(&self, targets: &mut Targets<'_>) -> Result<(), ExtensionError>;
}

impl<F> Contribution for F
where
    F: Fn(&mut Targets<'_>) -> Result<(), ExtensionError> + Send + Sync,
{
    fn run(&self, targets: &mut Targets<'_>) -> Result<(), ExtensionError> {
        self(targets)
    }
}

/// Wrap a closure as a shareable contribution
pub fn contribution<F>(f: F) -> Arc<dyn Contribution>
where
    F: Fn(&mut Targets<'_>) -> Result<(), ExtensionError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A registration together with its loaded entry point
#[derive(Clone)]
pub struct ResolvedExtension {
    pub registration: ExtensionRegistration,
    pub contribution: Arc<dyn Contribution>,
}

impl fmt::Debug for ResolvedExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedExtension")
            .field("registration", &self.registration)
            .finish_non_exhaustive()
    }
}

/// Extension-discovery service
///
/// `Ok(None)` means the vendor does not contribute this subject, which is
/// normal and skipped silently. Any `Err` aborts assembly.
pub trait ExtensionResolver: Send + Sync + fmt::Debug {
    fn resolve(
        &self,
        vendor: &str,
        subject: Subject,
    ) -> Result<Option<ResolvedExtension>, ExtensionError>;

    /// Root directory of a vendor package, used for flag-scoped includes
    fn package_dir(&self, context: &Path, vendor: &str) -> PathBuf {
        context.join("node_modules").join(vendor)
    }
}

/// In-process table of contributions keyed by vendor and subject
#[derive(Default, Clone)]
pub struct StaticResolver {
    entries: IndexMap<(String, Subject), Arc<dyn Contribution>>,
    package_dirs: HashMap<String, PathBuf>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `contribution` as `vendor`'s entry point for `subject`
    pub fn with(
        mut self,
        vendor: impl Into<String>,
        subject: Subject,
        contribution: Arc<dyn Contribution>,
    ) -> Self {
        self.entries.insert((vendor.into(), subject), contribution);
        self
    }

    /// Override where a vendor package lives
    pub fn with_package_dir(mut self, vendor: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.package_dirs.insert(vendor.into(), dir.into());
        self
    }
}

impl fmt::Debug for StaticResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticResolver")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .field("package_dirs", &self.package_dirs)
            .finish()
    }
}

impl ExtensionResolver for StaticResolver {
    fn resolve(
        &self,
        vendor: &str,
        subject: Subject,
    ) -> Result<Option<ResolvedExtension>, ExtensionError> {
        let key = (vendor.to_string(), subject);
        Ok(self.entries.get(&key).map(|contribution| ResolvedExtension {
            registration: ExtensionRegistration {
                name: vendor.to_string(),
                module_path: PathBuf::from(vendor).join(subject.module_stem()),
            },
            contribution: Arc::clone(contribution),
        }))
    }

    fn package_dir(&self, context: &Path, vendor: &str) -> PathBuf {
        match self.package_dirs.get(vendor) {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => context.join(dir),
            None => context.join("node_modules").join(vendor),
        }
    }
}
