use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::display::DisplayMode;
use crate::llm::{ApiKind, ReasoningEffort};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub api: Option<String>,
    pub model: Option<String>,
    pub system: Option<String>,
    pub reasoning_effort: Option<String>,
    pub reasoning_summary: Option<String>,
    pub timeout: Option<u64>,
    pub store: Option<bool>,
    pub tools: Option<bool>,
    pub mode: Option<String>,
    pub user_id: Option<String>,
}

impl ProfileConfig {
    fn validate(&self, name: &str) -> Result<(), String> {
        if let Some(api) = self.api.as_deref() {
            ApiKind::parse(api).ok_or_else(|| {
                format!(
                    "Invalid profile api '{api}' in profile '{name}'. Supported values: responses, chat."
                )
            })?;
        }
        if let Some(mode) = self.mode.as_deref() {
            DisplayMode::parse(mode).ok_or_else(|| {
                format!(
                    "Invalid profile mode '{mode}' in profile '{name}'. Supported values: clean, verbose, debug."
                )
            })?;
        }
        if let Some(effort) = self.reasoning_effort.as_deref() {
            ReasoningEffort::parse(effort).ok_or_else(|| {
                format!(
                    "Invalid profile reasoning_effort '{effort}' in profile '{name}'. Supported values: low, medium, high."
                )
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

fn read_config_file() -> Result<(PathBuf, ConfigFile), String> {
    let path = config_path()?;
    let raw = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;

    let config: ConfigFile = toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))?;
    Ok((path, config))
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, String> {
    let (path, config) = read_config_file()?;

    let profiles = config.profiles.ok_or_else(|| {
        format!(
            "Config file '{}' does not contain a [profiles] section.",
            path.display()
        )
    })?;

    let profile = profiles.get(name).cloned().ok_or_else(|| {
        format!(
            "Profile '{}' not found in config file '{}'.",
            name,
            path.display()
        )
    })?;
    profile.validate(name)?;
    Ok(profile)
}

/// Parses the config file and, if given, checks one profile. Returns the file path.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, String> {
    match profile {
        Some(name) => {
            load_profile(name)?;
            config_path()
        }
        None => {
            let (path, config) = read_config_file()?;
            for (name, profile) in config.profiles.unwrap_or_default() {
                profile.validate(&name)?;
            }
            Ok(path)
        }
    }
}

pub fn config_path() -> Result<PathBuf, String> {
    if let Ok(path) = env::var("MC_CONFIG") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("mailchat").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| {
        "Cannot resolve config path: set MC_CONFIG or HOME/XDG_CONFIG_HOME.".to_string()
    })?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("mailchat")
        .join("config.toml"))
}
