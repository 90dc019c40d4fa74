use owo_colors::AnsiColors;

use crate::display::DisplayMode;
use crate::display::layout::panel;
use crate::display::style::ColorFormatter;
use crate::settings::KeyboardSettings;

const COLLAPSED_PREVIEW_CHARS: usize = 100;
pub const REASONING_SECTION: &str = "Reasoning";

/// Result of a shortcut typed in the chat loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    ModeChanged(DisplayMode),
    SectionToggled { title: String, expanded: bool },
    ShortcutsDisabled,
}

impl KeyAction {
    /// One-line notice shown after the shortcut is applied.
    pub fn notice(&self) -> String {
        match self {
            Self::ModeChanged(mode) => format!("Switched to {mode} mode"),
            Self::SectionToggled { title, .. } => {
                format!("Toggled {} section", title.to_lowercase())
            }
            Self::ShortcutsDisabled => "Shortcuts disabled".to_string(),
        }
    }
}

/// Current mode plus the expand/collapse state of rendered sections.
#[derive(Debug, Clone)]
pub struct InteractiveDisplay {
    mode: DisplayMode,
    sections: Vec<(String, bool)>,
    keys: KeyboardSettings,
    enabled: bool,
}

impl InteractiveDisplay {
    pub fn new(mode: DisplayMode, keys: KeyboardSettings, enabled: bool) -> Self {
        Self {
            mode,
            sections: Vec::new(),
            keys,
            enabled,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_expanded(&self, title: &str) -> Option<bool> {
        self.sections
            .iter()
            .find(|(name, _)| name == title)
            .map(|(_, expanded)| *expanded)
    }

    /// Applies shortcut `key`; `None` when it maps to nothing or shortcuts are off.
    pub fn handle_key(&mut self, key: &str) -> Option<KeyAction> {
        if !self.enabled {
            return None;
        }
        let key = key.trim();
        if key == self.keys.clean_mode {
            self.mode = DisplayMode::Clean;
            Some(KeyAction::ModeChanged(self.mode))
        } else if key == self.keys.verbose_mode {
            self.mode = DisplayMode::Verbose;
            Some(KeyAction::ModeChanged(self.mode))
        } else if key == self.keys.debug_mode {
            self.mode = DisplayMode::Debug;
            Some(KeyAction::ModeChanged(self.mode))
        } else if key == self.keys.reasoning {
            let index = self
                .sections
                .iter()
                .position(|(name, _)| name == REASONING_SECTION)?;
            Some(self.toggle(index))
        } else if key == self.keys.expand_collapse {
            let last = self.sections.len().checked_sub(1)?;
            Some(self.toggle(last))
        } else if key == self.keys.exit_interactive {
            self.enabled = false;
            Some(KeyAction::ShortcutsDisabled)
        } else {
            None
        }
    }

    fn toggle(&mut self, index: usize) -> KeyAction {
        let (title, expanded) = &mut self.sections[index];
        *expanded = !*expanded;
        KeyAction::SectionToggled {
            title: title.clone(),
            expanded: *expanded,
        }
    }

    /// `[CLEAN]`, `[VERBOSE]` or `[DEBUG]` in the mode's color.
    pub fn mode_indicator(&self, colors: &ColorFormatter) -> String {
        let color = match self.mode {
            DisplayMode::Clean => AnsiColors::Green,
            DisplayMode::Verbose => AnsiColors::Yellow,
            DisplayMode::Debug => AnsiColors::Red,
        };
        colors.colored(&format!("[{}]", self.mode.as_str().to_uppercase()), color)
    }

    /// Shortcuts for the other modes and the reasoning toggle; empty when off.
    pub fn interaction_hints(&self, colors: &ColorFormatter) -> String {
        if !self.enabled {
            return String::new();
        }
        let mut hints = Vec::new();
        for (mode, key) in [
            (DisplayMode::Clean, &self.keys.clean_mode),
            (DisplayMode::Verbose, &self.keys.verbose_mode),
            (DisplayMode::Debug, &self.keys.debug_mode),
        ] {
            if mode != self.mode {
                hints.push(format!("'/{key}'={mode}"));
            }
        }
        if self.is_expanded(REASONING_SECTION).is_some() {
            hints.push(format!("'/{}'=reasoning", self.keys.reasoning));
        }
        if hints.is_empty() {
            return String::new();
        }
        colors.dim(&format!("[Press {}]", hints.join(" | ")))
    }

    /// Panel that shows `content` in full when expanded and a preview otherwise.
    ///
    /// A section keeps the state it was first registered with until toggled.
    pub fn expandable_section(
        &mut self,
        title: &str,
        content: &str,
        expanded: bool,
        colors: &ColorFormatter,
    ) -> String {
        let expanded = match self.is_expanded(title) {
            Some(state) => state,
            None => {
                self.sections.push((title.to_string(), expanded));
                expanded
            }
        };

        if expanded {
            return panel(&format!("▼ {title}"), content);
        }

        let preview = if content.chars().count() > COLLAPSED_PREVIEW_CHARS {
            let head: String = content.chars().take(COLLAPSED_PREVIEW_CHARS).collect();
            format!("{head}...")
        } else {
            content.to_string()
        };
        let body = format!(
            "{}\n\n{}",
            colors.dim(&preview),
            colors.dim_italic(&format!("Press '/{}' to expand", self.keys.expand_collapse))
        );
        panel(&format!("▶ {title}"), &body)
    }
}
