//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use buildpack_core::BuildpackError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Buildpack(e) => buildpack_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildpackError to miette Report
pub fn buildpack_error_to_miette(err: BuildpackError) -> Report {
    match err {
        BuildpackError::MissingRoot | BuildpackError::NotADirectory(_) => miette::miette!(
            help = "Pass the project root with --context <DIR>",
            "{}",
            err
        ),
        BuildpackError::UnrecognizedMode(_) => miette::miette!(
            help = "Use --mode production or --mode development",
            "{}",
            err
        ),
        BuildpackError::RequestNotFound(_) | BuildpackError::InvalidRequest(_) => miette::miette!(
            help = "Check buildpack.toml or the \"buildpack\" field of package.json",
            "{}",
            err
        ),
        BuildpackError::ExtensionDeclaration { extension, message } => miette::miette!(
            "Extension '{}' failed\n\n{}",
            extension,
            message
        ),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn root_errors_carry_help() {
        let report = cli_error_to_miette(CliError::Buildpack(BuildpackError::NotADirectory(
            PathBuf::from("/tmp/file"),
        )));
        assert!(report.to_string().contains("not a directory"));
        assert!(report.help().is_some());
    }

    #[test]
    fn extension_errors_name_the_extension() {
        let report = cli_error_to_miette(CliError::Buildpack(
            BuildpackError::ExtensionDeclaration {
                extension: "venia".to_string(),
                message: "boom".to_string(),
            },
        ));
        let text = report.to_string();
        assert!(text.contains("venia"));
        assert!(text.contains("boom"));
    }
}
