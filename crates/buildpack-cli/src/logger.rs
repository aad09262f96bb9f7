//! Logging setup for the buildpack CLI.
//!
//! Logs go to stderr so `configure` can write JSON to stdout.
//!
//! The level is determined in this order:
//! 1. `--verbose` flag: DEBUG for buildpack crates
//! 2. `--quiet` flag: ERROR only
//! 3. `RUST_LOG` environment variable: custom filter
//! 4. Default: INFO for buildpack crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "buildpack_core=debug,buildpack_cli=debug";
const QUIET_FILTER: &str = "buildpack_core=error,buildpack_cli=error";
const DEFAULT_FILTER: &str = "buildpack_core=info,buildpack_cli=info";

fn filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber. Call once, before any logging occurs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_filters_parse() {
        for directives in [VERBOSE_FILTER, QUIET_FILTER, DEFAULT_FILTER] {
            EnvFilter::try_new(directives).unwrap();
        }
    }

    #[test]
    fn verbose_wins_over_quiet() {
        assert_eq!(filter(true, true).to_string(), EnvFilter::new(VERBOSE_FILTER).to_string());
    }
}
