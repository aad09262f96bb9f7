//! Targets declared by buildpack itself.

use super::{ExtensionError, SyncHook, Targets};
use crate::features::FeatureGroup;

/// Name the built-in extension registers under; always first on the bus
pub const BASE_EXTENSION: &str = "buildpack";

/// Broadcast hook called once per vendor flag group before assembly
pub const SPECIAL_FEATURES: &str = "specialFeatures";

/// Declaration entry point of the base extension
pub fn declare_base(targets: &mut Targets<'_>) -> Result<(), ExtensionError> {
    targets.declare(SPECIAL_FEATURES, SyncHook::<FeatureGroup>::new())
}
