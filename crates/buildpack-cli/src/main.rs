//! Buildpack CLI entry point.

use buildpack_cli::{cli, commands, error, logger};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Configure(configure_args) => {
            commands::configure_execute(configure_args).await
        }
        cli::Command::Classify(classify_args) => commands::classify_execute(classify_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
