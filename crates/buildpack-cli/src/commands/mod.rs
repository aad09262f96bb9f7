//! Command implementations for the buildpack CLI.
//!
//! - [`configure`] - Assemble the client build configuration
//! - [`classify`] - Classify an asset manifest

pub mod classify;
pub mod configure;

pub use classify::execute as classify_execute;
pub use configure::execute as configure_execute;
