//! Configure command implementation.
//!
//! Assembles the client build configuration and prints it as JSON.

use buildpack_core::{
    BuildpackError, ConfigurationRequest, Configurator, FigmentEnvironmentLoader, NativeRuntime,
    RequestDiscovery,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::ConfigureArgs;
use crate::error::Result;

/// Execute the configure command.
///
/// # Errors
///
/// Returns errors for an unreadable request, an invalid project root or
/// environment, and failing extensions.
pub async fn execute(args: ConfigureArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let request = load_request(&args, &cwd)?;

    let mut environment = FigmentEnvironmentLoader::new();
    for section in &args.required_sections {
        environment = environment.require(section.clone());
    }

    let configurator = Configurator::new(
        Arc::new(NativeRuntime::new(cwd.clone())),
        Arc::new(environment),
    );
    let config = configurator.configure(&request).await?;
    let json = serde_json::to_string_pretty(&config)?;

    match args.out {
        Some(out) => {
            tokio::fs::write(&out, json).await?;
            tracing::info!(
                "Wrote {} configuration to {}",
                config.mode,
                out.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Discover the request, then apply command-line overrides.
fn load_request(args: &ConfigureArgs, cwd: &Path) -> Result<ConfigurationRequest> {
    let root = args
        .context
        .as_deref()
        .map(|context| absolute(context, cwd))
        .unwrap_or_else(|| cwd.to_path_buf());
    let discovery = RequestDiscovery::new(&root);

    let mut request = match &args.request {
        Some(path) => discovery.load_file(&absolute(path, cwd))?,
        None => match discovery.load() {
            Ok(request) => request,
            Err(BuildpackError::RequestNotFound(_)) => {
                tracing::debug!("No request file in {}, using defaults", root.display());
                ConfigurationRequest::new(&root)
            }
            Err(err) => return Err(err.into()),
        },
    };

    if args.context.is_some() {
        request.context = Some(root);
    }
    if let Some(mode) = &args.mode {
        request.env.mode = Some(mode.clone());
    }
    for vendor in &args.vendors {
        if !request.vendor.contains(vendor) {
            request.vendor.push(vendor.clone());
        }
    }

    Ok(request)
}

fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn flags_override_discovered_request() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("buildpack.toml"),
            "vendor = [\"venia\"]\n\n[env]\nmode = \"production\"\n",
        )
        .unwrap();

        let args = ConfigureArgs {
            context: Some(temp.path().to_path_buf()),
            mode: Some("development".to_string()),
            vendors: vec!["venia".to_string(), "extra".to_string()],
            ..ConfigureArgs::default()
        };
        let request = load_request(&args, Path::new("/")).unwrap();

        assert_eq!(request.context.as_deref(), Some(temp.path()));
        assert_eq!(request.env.mode.as_deref(), Some("development"));
        assert_eq!(request.vendor, ["venia", "extra"]);
    }

    #[test]
    fn defaults_without_request_file() {
        let temp = TempDir::new().unwrap();
        let args = ConfigureArgs::default();
        let request = load_request(&args, temp.path()).unwrap();

        assert_eq!(request.context.as_deref(), Some(temp.path()));
        assert!(request.vendor.is_empty());
        assert!(request.env.mode.is_none());
    }

    #[test]
    fn relative_paths_resolve_against_cwd() {
        assert_eq!(
            absolute(Path::new("web"), Path::new("/srv")),
            PathBuf::from("/srv/web")
        );
        assert_eq!(
            absolute(Path::new("/abs"), Path::new("/srv")),
            PathBuf::from("/abs")
        );
    }
}
