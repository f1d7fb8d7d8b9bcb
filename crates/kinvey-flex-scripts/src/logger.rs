//! Logging setup for the flex scripts.
//!
//! `--verbose` turns on debug output for both workspace crates, `--quiet`
//! keeps errors only, otherwise `RUST_LOG` applies with an info default.
//!
//! # Example
//!
//! ```rust,no_run
//! use kinvey_flex_scripts::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Relaying to local service");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "kinvey_flex_scripts=debug,kinvey_cli_wrapper=debug";
const QUIET_FILTER: &str = "kinvey_flex_scripts=error,kinvey_cli_wrapper=error";
const DEFAULT_FILTER: &str = "kinvey_flex_scripts=info,kinvey_cli_wrapper=info";

/// Builds the filter for the given flags.
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber.
///
/// Call once at the start of the program.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging (overrides `quiet`)
/// * `quiet` - Only show error-level logs
/// * `no_color` - Disable colored output
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(fmt_layer)
        .try_init();
}
