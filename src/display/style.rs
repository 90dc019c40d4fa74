use owo_colors::{AnsiColors, OwoColorize, Style};

use crate::settings::ColorSettings;

/// Maps a configured color name to a terminal color.
pub fn parse_color(name: &str) -> AnsiColors {
    match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "black" => AnsiColors::Black,
        "red" => AnsiColors::Red,
        "green" => AnsiColors::Green,
        "yellow" => AnsiColors::Yellow,
        "blue" => AnsiColors::Blue,
        "magenta" => AnsiColors::Magenta,
        "cyan" => AnsiColors::Cyan,
        "white" => AnsiColors::White,
        "bright_black" | "grey" | "gray" => AnsiColors::BrightBlack,
        "bright_red" => AnsiColors::BrightRed,
        "bright_green" => AnsiColors::BrightGreen,
        "bright_yellow" => AnsiColors::BrightYellow,
        "bright_blue" => AnsiColors::BrightBlue,
        "bright_magenta" => AnsiColors::BrightMagenta,
        "bright_cyan" => AnsiColors::BrightCyan,
        "bright_white" => AnsiColors::BrightWhite,
        _ => AnsiColors::Default,
    }
}

/// Applies the configured color per content type, or nothing when colors are off.
#[derive(Debug, Clone)]
pub struct ColorFormatter {
    colors: ColorSettings,
    enabled: bool,
}

impl ColorFormatter {
    pub fn new(colors: ColorSettings, enabled: bool) -> Self {
        Self { colors, enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn header(&self, text: &str) -> String {
        self.paint(text, Style::new().color(parse_color(&self.colors.header)).bold())
    }

    pub fn content(&self, text: &str) -> String {
        self.paint(text, Style::new().color(parse_color(&self.colors.content)))
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, Style::new().color(parse_color(&self.colors.success)))
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, Style::new().color(parse_color(&self.colors.error)).bold())
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, Style::new().color(parse_color(&self.colors.warning)))
    }

    pub fn technical(&self, text: &str) -> String {
        self.paint(text, Style::new().color(parse_color(&self.colors.technical)))
    }

    pub fn reasoning(&self, text: &str) -> String {
        self.paint(text, Style::new().color(parse_color(&self.colors.reasoning)))
    }

    pub fn usage(&self, text: &str) -> String {
        self.paint(text, Style::new().color(parse_color(&self.colors.usage)))
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }

    pub fn dim_italic(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed().italic())
    }

    /// Arbitrary color, used for the mode indicator.
    pub fn colored(&self, text: &str, color: AnsiColors) -> String {
        self.paint(text, Style::new().color(color))
    }

    /// Multi-line text is styled line by line so table borders stay clean.
    fn paint(&self, text: &str, style: Style) -> String {
        if !self.enabled {
            return text.to_string();
        }
        text.split('\n')
            .map(|line| line.style(style).to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
