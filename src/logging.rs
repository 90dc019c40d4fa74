use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Environment variable holding an explicit tracing filter, e.g. `mailchat=debug`.
pub const LOG_ENV: &str = "MC_LOG";

/// Installs the stderr subscriber.
///
/// `--quiet` turns logging off and `--verbose` raises it to debug. Otherwise
/// `MC_LOG` applies, defaulting to warnings.
pub fn init(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("mailchat=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .try_init();
}
