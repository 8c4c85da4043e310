//! Logging setup for the CLI.
//!
//! The filter is chosen in this order:
//! 1. `--verbose`: debug for splitpack crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for splitpack crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "splitpack=debug,splitpack_bundler=debug,splitpack_cli=debug";
const QUIET_FILTER: &str = "splitpack=error,splitpack_bundler=error,splitpack_cli=error";
const DEFAULT_FILTER: &str = "splitpack=info,splitpack_bundler=info,splitpack_cli=info";

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before any logging.
///
/// ```rust,no_run
/// use splitpack_cli::logger::init_logger;
///
/// init_logger(false, false, !splitpack_cli::logger::should_use_colors());
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

/// Whether stderr should get ANSI colors.
///
/// `NO_COLOR` disables them, `FORCE_COLOR` forces them, otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
