use clap::{Args, Subcommand};
use serde_json::json;

use crate::config;
use crate::display::DisplayMode;
use crate::settings::{self, Settings};

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    /// Parse the profile file and validate profiles
    Check {
        #[arg(long)]
        profile: Option<String>,
    },
    /// Print the effective display settings and file locations
    Show,
    /// Persist the default display mode
    Mode {
        #[arg(value_enum)]
        mode: DisplayMode,
    },
    /// Write a settings file with the default values
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

fn show() -> Result<(), String> {
    let settings = Settings::load();
    let body = json!({
        "config_path": config::config_path().ok().map(|path| path.display().to_string()),
        "settings_path": settings::settings_path().map(|path| path.display().to_string()),
        "settings": settings,
    });
    let raw = serde_json::to_string_pretty(&body)
        .map_err(|err| format!("Failed to serialize settings: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn init(force: bool) -> Result<(), String> {
    let path = settings::settings_path().ok_or_else(|| {
        "Cannot resolve settings path: set MC_SETTINGS or HOME/XDG_CONFIG_HOME.".to_string()
    })?;
    if path.exists() && !force {
        return Err(format!(
            "Settings file '{}' already exists. Use --force to overwrite.",
            path.display()
        ));
    }
    Settings::default()
        .save_to(&path)
        .map_err(|err| err.to_string())?;
    println!("settings written: {}", path.display());
    Ok(())
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.command {
        ConfigSubcommand::Check { profile } => {
            let path = config::validate_config(profile.as_deref())?;
            println!("config OK: {}", path.display());
            Ok(())
        }
        ConfigSubcommand::Show => show(),
        ConfigSubcommand::Mode { mode } => {
            let path = settings::update_display_mode(mode.as_str()).map_err(|err| err.to_string())?;
            println!("default mode set to {mode}: {}", path.display());
            Ok(())
        }
        ConfigSubcommand::Init { force } => init(force),
    }
}
