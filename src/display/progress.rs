use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr while a request is in flight.
///
/// indicatif draws nothing when stderr is not a terminal; `quiet` hides it
/// everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ProgressDisplay {
    quiet: bool,
}

impl ProgressDisplay {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn start(&self, message: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new(false)
    }
}
