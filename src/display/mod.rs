//! Terminal rendering of model responses.
//!
//! Responses are handled as raw JSON: [`extract`] probes the payload for the
//! fields worth showing, and [`formatter`] lays them out according to the
//! active [`DisplayMode`].

pub mod cost;
pub mod extract;
pub mod formatter;
pub mod interactive;
pub mod layout;
pub mod progress;
pub mod style;
pub mod truncate;

use std::fmt;

use clap::ValueEnum;

pub use extract::{ContentExtractor, ExtractedContent};
pub use formatter::ResponseFormatter;

/// How much of a response is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DisplayMode {
    /// Reply text only.
    #[default]
    Clean,
    /// Reply plus reasoning, usage and cost.
    Verbose,
    /// Everything, including metadata and the raw payload.
    Debug,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [Self::Clean, Self::Verbose, Self::Debug];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clean" => Some(Self::Clean),
            "verbose" => Some(Self::Verbose),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::DisplayMode;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(DisplayMode::parse("Verbose"), Some(DisplayMode::Verbose));
        assert_eq!(DisplayMode::parse(" debug "), Some(DisplayMode::Debug));
        assert_eq!(DisplayMode::parse("loud"), None);
    }
}
