//! Extension bus: per-request hook registry
//!
//! A [`BuildBus`] is built for every configuration request. The base
//! extension declares its targets first, then every vendor's `Declare`
//! contribution runs in vendor order, then every `Intercept` contribution in
//! the same order. Hooks are keyed by the extension that declared them, so two
//! vendors can declare targets with the same name without colliding.

mod base;
mod extension;
mod hook;

pub use base::{BASE_EXTENSION, SPECIAL_FEATURES, declare_base};
pub use extension::{
    Contribution, ExtensionRegistration, ExtensionResolver, ResolvedExtension, StaticResolver,
    Subject, contribution,
};
pub use hook::{HookError, SyncHook};

use indexmap::IndexMap;
use std::any::Any;
use std::path::PathBuf;

use crate::error::{BuildpackError, Result};
use crate::features::{FeatureGroup, SpecialFlags};

/// Error returned by a contribution or a tap
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ExtensionError(String);

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for ExtensionError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for ExtensionError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

type HookKey = (String, String);

/// Registry of declared hooks for one configuration request
#[derive(Default)]
pub struct BuildBus {
    hooks: IndexMap<HookKey, Box<dyn Any + Send + Sync>>,
    registrations: Vec<ExtensionRegistration>,
}

impl BuildBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover and run every contribution for the base extension and `vendors`.
    ///
    /// Duplicate vendor names are ignored after their first occurrence. A
    /// vendor named after the built-in extension is rejected.
    pub fn attach(resolver: &dyn ExtensionResolver, vendors: &[String]) -> Result<Self> {
        let mut bus = Self::new();

        let mut names: Vec<&str> = vec![BASE_EXTENSION];
        for vendor in vendors {
            reject_reserved(vendor)?;
            if names.contains(&vendor.as_str()) {
                tracing::warn!("Ignoring duplicate extension '{}'", vendor);
                continue;
            }
            names.push(vendor);
        }

        for subject in [Subject::Declare, Subject::Intercept] {
            for &name in &names {
                if subject == Subject::Declare && name == BASE_EXTENSION {
                    let registration = ExtensionRegistration {
                        name: BASE_EXTENSION.to_string(),
                        module_path: PathBuf::from(BASE_EXTENSION).join(subject.module_stem()),
                    };
                    bus.run(registration, &declare_base)?;
                    continue;
                }

                let resolved = resolver.resolve(name, subject).map_err(|err| {
                    BuildpackError::ExtensionDeclaration {
                        extension: name.to_string(),
                        message: err.to_string(),
                    }
                })?;

                match resolved {
                    Some(extension) => {
                        bus.run(extension.registration, extension.contribution.as_ref())?
                    }
                    None => tracing::trace!("{} has no {}", name, subject.convention()),
                }
            }
        }

        Ok(bus)
    }

    fn run(
        &mut self,
        registration: ExtensionRegistration,
        contribution: &dyn Contribution,
    ) -> Result<()> {
        tracing::debug!(
            "Running contribution {} from {}",
            registration.name,
            registration.module_path.display()
        );

        let mut targets = self.targets(registration.name.clone());
        contribution
            .run(&mut targets)
            .map_err(|err| BuildpackError::ExtensionDeclaration {
                extension: registration.name.clone(),
                message: err.to_string(),
            })?;

        self.registrations.push(registration);
        Ok(())
    }

    /// Registrar acting on behalf of `extension`
    pub fn targets(&mut self, extension: impl Into<String>) -> Targets<'_> {
        Targets {
            bus: self,
            extension: extension.into(),
        }
    }

    /// Contributions that ran, in execution order
    pub fn registrations(&self) -> &[ExtensionRegistration] {
        &self.registrations
    }

    pub fn has_target(&self, owner: &str, hook: &str) -> bool {
        self.hooks
            .contains_key(&(owner.to_string(), hook.to_string()))
    }

    /// Borrow a declared hook, checking its payload type
    pub fn hook<T: 'static>(&self, owner: &str, hook: &str) -> Option<&SyncHook<T>> {
        self.hooks
            .get(&(owner.to_string(), hook.to_string()))
            .and_then(|declared| declared.downcast_ref::<SyncHook<T>>())
    }

    fn hook_mut<T: 'static>(&mut self, owner: &str, hook: &str) -> Option<&mut SyncHook<T>> {
        self.hooks
            .get_mut(&(owner.to_string(), hook.to_string()))
            .and_then(|declared| declared.downcast_mut::<SyncHook<T>>())
    }

    /// Call a declared hook with `payload`
    pub fn call<T: 'static>(&self, owner: &str, hook: &str, payload: &mut T) -> Result<()> {
        let target = self
            .hook::<T>(owner, hook)
            .ok_or_else(|| BuildpackError::UnknownTarget {
                owner: owner.to_string(),
                hook: hook.to_string(),
            })?;

        target
            .call(payload)
            .map_err(|err| BuildpackError::ExtensionDeclaration {
                extension: err.tap,
                message: err.source.to_string(),
            })
    }

    /// Run `specialFeatures` once per vendor flag group.
    ///
    /// Groups follow `vendors` order, then any remaining `special` keys in map
    /// order. A vendor without an entry in `special` starts with every flag off.
    pub fn dispatch_special_features(
        &self,
        vendors: &[String],
        special: &SpecialFlags,
    ) -> Result<Vec<FeatureGroup>> {
        let mut order: Vec<&str> = Vec::with_capacity(vendors.len() + special.len());
        for name in vendors.iter().chain(special.keys()) {
            reject_reserved(name)?;
            if !order.contains(&name.as_str()) {
                order.push(name);
            }
        }

        let mut groups = Vec::with_capacity(order.len());
        for vendor in order {
            let flags = special.get(vendor).copied().unwrap_or_default();
            let mut group = FeatureGroup::new(vendor, flags);
            self.call(BASE_EXTENSION, SPECIAL_FEATURES, &mut group)?;
            tracing::trace!("Feature flags for {}: {:?}", group.vendor, group.flags);
            groups.push(group);
        }

        Ok(groups)
    }
}

/// Vendors may not reuse the built-in extension's name
fn reject_reserved(vendor: &str) -> Result<()> {
    if vendor == BASE_EXTENSION {
        return Err(BuildpackError::ExtensionDeclaration {
            extension: vendor.to_string(),
            message: format!(
                "'{}' is reserved for the built-in extension",
                BASE_EXTENSION
            ),
        });
    }
    Ok(())
}

impl std::fmt::Debug for BuildBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildBus")
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .field("registrations", &self.registrations)
            .finish()
    }
}

/// Registrar handed to a contribution
pub struct Targets<'a> {
    bus: &'a mut BuildBus,
    extension: String,
}

impl Targets<'_> {
    /// Name of the extension this registrar acts for
    pub fn name(&self) -> &str {
        &self.extension
    }

    /// Declare a hook owned by this extension
    pub fn declare<T: 'static>(
        &mut self,
        hook: impl Into<String>,
        target: SyncHook<T>,
    ) -> std::result::Result<(), ExtensionError> {
        let key = (self.extension.clone(), hook.into());
        if self.bus.hooks.contains_key(&key) {
            return Err(ExtensionError::new(format!(
                "target '{}' is already declared",
                key.1
            )));
        }

        tracing::trace!("{} declares {}", key.0, key.1);
        self.bus.hooks.insert(key, Box::new(target));
        Ok(())
    }

    /// Subscribe to `owner`'s hook; the tap is named after this extension
    pub fn tap<T, F>(
        &mut self,
        owner: &str,
        hook: &str,
        callback: F,
    ) -> std::result::Result<(), ExtensionError>
    where
        T: 'static,
        F: Fn(&mut T) -> std::result::Result<(), ExtensionError> + Send + Sync + 'static,
    {
        let tap_name = self.extension.clone();
        let target = self.bus.hook_mut::<T>(owner, hook).ok_or_else(|| {
            ExtensionError::new(format!(
                "no target '{}' declared by '{}' with a matching payload",
                hook, owner
            ))
        })?;
        target.tap(tap_name, callback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureFlags;

    fn vendors(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn base_declares_special_features_first() {
        let bus = BuildBus::attach(&StaticResolver::new(), &[]).unwrap();
        assert!(bus.has_target(BASE_EXTENSION, SPECIAL_FEATURES));
        assert_eq!(bus.registrations().len(), 1);
        assert_eq!(bus.registrations()[0].name, BASE_EXTENSION);
    }

    #[test]
    fn declarations_run_before_intercepts_in_vendor_order() {
        let resolver = StaticResolver::new()
            .with(
                "a",
                Subject::Intercept,
                contribution(|targets| {
                    targets.tap::<u32, _>("b", "counter", |n| {
                        *n *= 10;
                        Ok(())
                    })
                }),
            )
            .with(
                "b",
                Subject::Declare,
                contribution(|targets| targets.declare("counter", SyncHook::<u32>::new())),
            )
            .with(
                "b",
                Subject::Intercept,
                contribution(|targets| {
                    targets.tap::<u32, _>("b", "counter", |n| {
                        *n += 1;
                        Ok(())
                    })
                }),
            );

        let bus = BuildBus::attach(&resolver, &vendors(&["a", "b"])).unwrap();

        let order: Vec<_> = bus
            .registrations()
            .iter()
            .map(|r| r.module_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(order, ["buildpack/declare", "b/declare", "a/intercept", "b/intercept"]);

        let mut n: u32 = 1;
        bus.call("b", "counter", &mut n).unwrap();
        assert_eq!(n, 11);
        assert_eq!(
            bus.hook::<u32>("b", "counter").unwrap().tap_names().collect::<Vec<_>>(),
            ["a", "b"]
        );
    }

    #[test]
    fn failing_contribution_is_fatal() {
        let resolver = StaticResolver::new().with(
            "broken",
            Subject::Declare,
            contribution(|_| Err(ExtensionError::new("cannot declare"))),
        );

        let err = BuildBus::attach(&resolver, &vendors(&["broken"])).unwrap_err();
        match err {
            BuildpackError::ExtensionDeclaration { extension, message } => {
                assert_eq!(extension, "broken");
                assert_eq!(message, "cannot declare");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[derive(Debug)]
    struct BrokenResolver;

    impl ExtensionResolver for BrokenResolver {
        fn resolve(
            &self,
            vendor: &str,
            _subject: Subject,
        ) -> std::result::Result<Option<ResolvedExtension>, ExtensionError> {
            Err(ExtensionError::new(format!("cannot load {}", vendor)))
        }
    }

    #[test]
    fn resolver_error_is_fatal() {
        let err = BuildBus::attach(&BrokenResolver, &vendors(&["venia"])).unwrap_err();
        match err {
            BuildpackError::ExtensionDeclaration { extension, message } => {
                assert_eq!(extension, "venia");
                assert_eq!(message, "cannot load venia");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn vendor_named_like_base_is_rejected() {
        let err = BuildBus::attach(&StaticResolver::new(), &vendors(&[BASE_EXTENSION])).unwrap_err();
        assert!(matches!(
            err,
            BuildpackError::ExtensionDeclaration { ref extension, .. } if extension == BASE_EXTENSION
        ));
        assert!(err.to_string().contains("reserved"));

        let bus = BuildBus::attach(&StaticResolver::new(), &[]).unwrap();
        let mut special = SpecialFlags::new();
        special.insert(BASE_EXTENSION.to_string(), FeatureFlags::all());
        assert!(bus.dispatch_special_features(&[], &special).is_err());
    }

    #[test]
    fn tapping_unknown_target_fails() {
        let resolver = StaticResolver::new().with(
            "a",
            Subject::Intercept,
            contribution(|targets| targets.tap::<u32, _>("nobody", "nothing", |_| Ok(()))),
        );

        let err = BuildBus::attach(&resolver, &vendors(&["a"])).unwrap_err();
        assert!(err.to_string().contains("no target 'nothing'"));
    }

    #[test]
    fn calling_with_wrong_payload_is_unknown_target() {
        let bus = BuildBus::attach(&StaticResolver::new(), &[]).unwrap();
        let err = bus
            .call(BASE_EXTENSION, SPECIAL_FEATURES, &mut 0u32)
            .unwrap_err();
        assert!(matches!(err, BuildpackError::UnknownTarget { .. }));
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut bus = BuildBus::new();
        let mut targets = bus.targets("a");
        targets.declare("x", SyncHook::<u8>::new()).unwrap();
        assert!(targets.declare("x", SyncHook::<u8>::new()).is_err());
    }

    #[test]
    fn special_features_dispatch_is_per_vendor() {
        let resolver = StaticResolver::new().with(
            "venia",
            Subject::Intercept,
            contribution(|targets| {
                targets.tap::<FeatureGroup, _>(BASE_EXTENSION, SPECIAL_FEATURES, |group| {
                    if group.vendor == "venia" {
                        group.flags.root_components = true;
                    }
                    Ok(())
                })
            }),
        );
        let bus = BuildBus::attach(&resolver, &vendors(&["venia"])).unwrap();

        let mut special = SpecialFlags::new();
        special.insert(
            "extra".to_string(),
            FeatureFlags {
                css_modules: true,
                ..FeatureFlags::default()
            },
        );

        let groups = bus
            .dispatch_special_features(&vendors(&["venia"]), &special)
            .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].vendor, "venia");
        assert!(groups[0].flags.root_components);
        assert!(!groups[0].flags.css_modules);
        assert_eq!(groups[1].vendor, "extra");
        assert!(groups[1].flags.css_modules);
        assert!(!groups[1].flags.root_components);
    }
}
