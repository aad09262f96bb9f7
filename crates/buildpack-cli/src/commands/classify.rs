//! Classify command implementation.
//!
//! Reads an asset manifest, sorts its files into load and prefetch groups and
//! writes it back.

use buildpack_core::AssetManifest;
use buildpack_core::ManifestClassifier;
use buildpack_core::manifest::PatternConvention;
use std::sync::Arc;

use crate::cli::ClassifyArgs;
use crate::error::{CliError, Result};

/// Execute the classify command.
///
/// # Errors
///
/// Returns errors for a missing or malformed manifest, a manifest that was
/// already classified, and an invalid `--pattern`.
pub async fn execute(args: ClassifyArgs) -> Result<()> {
    if !args.manifest.is_file() {
        return Err(CliError::FileNotFound(args.manifest));
    }

    let classifier = match &args.pattern {
        Some(pattern) => {
            let convention = PatternConvention::new(pattern)
                .map_err(|e| CliError::InvalidArgument(format!("--pattern: {}", e)))?;
            ManifestClassifier::new(Arc::new(convention))
        }
        None => ManifestClassifier::default(),
    };

    let content = tokio::fs::read_to_string(&args.manifest).await?;
    let mut manifest: AssetManifest = serde_json::from_str(&content)?;
    if manifest.bundles.is_some() {
        return Err(CliError::InvalidArgument(format!(
            "{} is already classified",
            args.manifest.display()
        )));
    }

    classifier.classify(&mut manifest);

    let out = args.out.unwrap_or(args.manifest);
    tokio::fs::write(&out, serde_json::to_string_pretty(&manifest)?).await?;
    tracing::info!("Classified manifest written to {}", out.display());

    Ok(())
}
