//! Client build configuration assembly.
//!
//! Given a project root, an environment and a list of vendor packages, this
//! crate assembles the bundler configuration for the client build and
//! provides the transform that classifies the emitted asset manifest into
//! load and prefetch groups.
//!
//! ```no_run
//! use std::sync::Arc;
//! use buildpack_core::{
//!     ConfigurationRequest, Configurator, FigmentEnvironmentLoader, NativeRuntime,
//! };
//!
//! # async fn run() -> buildpack_core::Result<()> {
//! let configurator = Configurator::new(
//!     Arc::new(NativeRuntime::new(".")),
//!     Arc::new(FigmentEnvironmentLoader::new()),
//! );
//! let config = configurator
//!     .configure(&ConfigurationRequest::new(".").vendor("@magento/venia-ui"))
//!     .await?;
//! println!("{}", config.mode);
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod bus;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod features;
pub mod manifest;
pub mod request;
pub mod root;
pub mod runtime;

// Re-export main types
pub use assemble::{BuildConfiguration, Configurator, PluginSpec};
pub use bus::{BuildBus, ExtensionError, ExtensionResolver, StaticResolver, Subject};
pub use discovery::RequestDiscovery;
pub use environment::{
    EnvOverrides, EnvironmentLoadError, EnvironmentLoader, FigmentEnvironmentLoader,
    LoadedEnvironment, Mode, Sections,
};
pub use error::{BuildpackError, Result};
pub use features::{FeatureFlags, FeatureGroup, SpecialFlags};
pub use manifest::{AssetManifest, ManifestClassifier};
pub use request::ConfigurationRequest;
pub use runtime::{FileMetadata, MemoryRuntime, NativeRuntime, Runtime, RuntimeError};
