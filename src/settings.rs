//! Display settings persisted as a small JSON file.
//!
//! Values are layered: built-in defaults, then the settings file merged over
//! them key by key, then `MC_*` environment overrides. Problems with any
//! layer are logged and the layer is skipped; loading never fails.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::display::DisplayMode;

pub const SETTINGS_ENV: &str = "MC_SETTINGS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub default_mode: String,
    pub enable_colors: bool,
    pub enable_interactive: bool,
    pub enable_cost_tracking: bool,
    pub show_timestamps: bool,
    pub show_model_info: bool,
    pub max_content_length: usize,
    pub truncate_long_content: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            default_mode: DisplayMode::Clean.as_str().to_string(),
            enable_colors: true,
            enable_interactive: true,
            enable_cost_tracking: true,
            show_timestamps: false,
            show_model_info: false,
            max_content_length: 1000,
            truncate_long_content: true,
        }
    }
}

/// Color names per content type. Unknown names render as the terminal default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub header: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub technical: String,
    pub content: String,
    pub reasoning: String,
    pub usage: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            header: "cyan".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            technical: "bright_black".to_string(),
            content: "white".to_string(),
            reasoning: "blue".to_string(),
            usage: "magenta".to_string(),
        }
    }
}

/// Chat shortcuts. Each key is typed as `/<key>` on its own line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardSettings {
    pub clean_mode: String,
    pub verbose_mode: String,
    pub debug_mode: String,
    pub reasoning: String,
    pub expand_collapse: String,
    pub exit_interactive: String,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            clean_mode: "c".to_string(),
            verbose_mode: "v".to_string(),
            debug_mode: "d".to_string(),
            reasoning: "r".to_string(),
            expand_collapse: "e".to_string(),
            exit_interactive: "q".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub colors: ColorSettings,
    pub keyboard: KeyboardSettings,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Cannot resolve settings path: set {SETTINGS_ENV} or HOME/XDG_CONFIG_HOME.")]
    NoPath,
    #[error("Invalid display mode '{0}'. Supported values: clean, verbose, debug.")]
    InvalidMode(String),
    #[error("Failed to create settings directory '{path}': {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("Failed to write settings file '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Settings {
    /// Loads settings from the default path and the process environment.
    pub fn load() -> Self {
        Self::load_from(settings_path().as_deref(), |key| env::var(key).ok())
    }

    /// Loads settings from `path` (if it exists) and the given environment lookup.
    pub fn load_from(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = path
            .and_then(read_settings_file)
            .map(merge_over_defaults)
            .unwrap_or_default();
        settings.apply_env(&env);
        settings.validate();
        settings
    }

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::parse(&self.display.default_mode).unwrap_or_default()
    }

    /// Sets the default mode if `mode` names a valid one.
    pub fn set_display_mode(&mut self, mode: &str) -> Result<DisplayMode, SettingsError> {
        let parsed =
            DisplayMode::parse(mode).ok_or_else(|| SettingsError::InvalidMode(mode.to_string()))?;
        self.display.default_mode = parsed.as_str().to_string();
        Ok(parsed)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = settings_path().ok_or(SettingsError::NoPath)?;
        self.save_to(&path)?;
        Ok(path)
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) {
        if let Some(mode) = env("MC_DEFAULT_MODE") {
            self.display.default_mode = mode.trim().to_ascii_lowercase();
        }
        let flags: [(&str, &mut bool); 6] = [
            ("MC_ENABLE_COLORS", &mut self.display.enable_colors),
            ("MC_ENABLE_INTERACTIVE", &mut self.display.enable_interactive),
            ("MC_ENABLE_COST_TRACKING", &mut self.display.enable_cost_tracking),
            ("MC_SHOW_TIMESTAMPS", &mut self.display.show_timestamps),
            ("MC_SHOW_MODEL_INFO", &mut self.display.show_model_info),
            ("MC_TRUNCATE_LONG_CONTENT", &mut self.display.truncate_long_content),
        ];
        for (key, slot) in flags {
            if let Some(raw) = env(key) {
                *slot = parse_bool(&raw);
            }
        }
        if let Some(raw) = env("MC_MAX_CONTENT_LENGTH") {
            match raw.trim().parse::<usize>() {
                Ok(value) => self.display.max_content_length = value,
                Err(err) => warn!("Invalid value for MC_MAX_CONTENT_LENGTH: {raw}, error: {err}"),
            }
        }
    }

    fn validate(&mut self) {
        if DisplayMode::parse(&self.display.default_mode).is_none() {
            self.display.default_mode = DisplayMode::Clean.as_str().to_string();
        }
    }
}

/// Persists `mode` as the default display mode in the settings file.
pub fn update_display_mode(mode: &str) -> Result<PathBuf, SettingsError> {
    let path = settings_path().ok_or(SettingsError::NoPath)?;
    let mut settings = Settings::load_from(Some(&path), |key| env::var(key).ok());
    settings.set_display_mode(mode)?;
    settings.save_to(&path)?;
    Ok(path)
}

pub fn settings_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(SETTINGS_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("mailchat").join("settings.json"));
        }
    }

    let home = env::var("HOME").ok()?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("mailchat")
            .join("settings.json"),
    )
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn read_settings_file(path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("Could not load settings file {}: {err}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Could not load settings file {}: {err}", path.display());
            None
        }
    }
}

fn merge_over_defaults(overrides: Value) -> Settings {
    let mut base = match serde_json::to_value(Settings::default()) {
        Ok(base) => base,
        Err(_) => return Settings::default(),
    };
    merge_json(&mut base, overrides);
    serde_json::from_value(base).unwrap_or_else(|err| {
        warn!("Ignoring settings file with invalid values: {err}");
        Settings::default()
    })
}

/// Recursively copies keys of `overrides` that already exist in `base`.
fn merge_json(base: &mut Value, overrides: Value) {
    let (Value::Object(base_map), Value::Object(override_map)) = (base, overrides) else {
        return;
    };
    for (key, value) in override_map {
        let Some(slot) = base_map.get_mut(&key) else {
            continue;
        };
        if value.is_object() && slot.is_object() {
            merge_json(slot, value);
        } else {
            *slot = value;
        }
    }
}
