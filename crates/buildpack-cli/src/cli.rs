//! Command-line interface definition for buildpack.
//!
//! - `buildpack configure` - Assemble the client build configuration
//! - `buildpack classify` - Classify an emitted asset manifest

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Buildpack - client build configuration for progressive web apps
#[derive(Parser, Debug)]
#[command(
    name = "buildpack",
    version,
    about = "Assemble client build configuration and classify asset manifests"
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble the build configuration for a project
    ///
    /// The request is discovered from buildpack.toml or the "buildpack" field
    /// of package.json in the project root. Flags override discovered values.
    Configure(ConfigureArgs),

    /// Classify an asset manifest into load and prefetch groups
    Classify(ClassifyArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigureArgs {
    /// Project root directory
    #[arg(short, long, value_name = "DIR")]
    pub context: Option<PathBuf>,

    /// Explicit request file (.toml or .json) instead of discovery
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Build mode override (production or development)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Vendor package to attach; repeat for several
    #[arg(long = "vendor", value_name = "PACKAGE")]
    pub vendors: Vec<String>,

    /// Environment section that must be present
    #[arg(long = "require", value_name = "SECTION")]
    pub required_sections: Vec<String>,

    /// Write the configuration here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ClassifyArgs {
    /// Asset manifest written by the bundler
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Write the classified manifest here instead of in place
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Regex with a `base` group recognizing root-component keys
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_configure_flags() {
        let cli = Cli::parse_from([
            "buildpack",
            "configure",
            "--context",
            "/app",
            "--mode",
            "development",
            "--vendor",
            "a",
            "--vendor",
            "b",
        ]);
        let Command::Configure(args) = cli.command else {
            panic!("expected configure");
        };
        assert_eq!(args.context, Some(PathBuf::from("/app")));
        assert_eq!(args.mode.as_deref(), Some("development"));
        assert_eq!(args.vendors, ["a", "b"]);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["buildpack", "-v", "-q", "classify", "m.json"]);
        assert!(result.is_err());
    }
}
