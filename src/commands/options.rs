use std::env;

use clap::Args;

use crate::config::{self, ProfileConfig};
use crate::display::DisplayMode;
use crate::llm::{ApiKind, ReasoningEffort, TurnOptions};

/// Request flags shared by `chat` and `ask`.
#[derive(Debug, Args, Clone, Default)]
pub struct TurnArgs {
    /// Profile from the config file
    #[arg(long)]
    pub profile: Option<String>,
    /// API flavour: responses or chat
    #[arg(long)]
    pub api: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    /// Developer/system prompt sent ahead of the conversation
    #[arg(long)]
    pub system: Option<String>,
    /// low, medium or high (Responses API only)
    #[arg(long)]
    pub reasoning_effort: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Do not offer mailbox functions to the model
    #[arg(long)]
    pub no_tools: bool,
    /// Ask the API not to store responses
    #[arg(long)]
    pub no_store: bool,
    #[arg(long, value_enum)]
    pub mode: Option<DisplayMode>,
    #[arg(long)]
    pub no_color: bool,
    /// Mailbox used when the model does not name one
    #[arg(long)]
    pub user: Option<String>,
}

/// Flags, `MC_*` environment and profile merged into one request setup.
#[derive(Debug, Clone)]
pub struct ResolvedTurn {
    pub options: TurnOptions,
    pub system: Option<String>,
    /// `None` leaves the display settings' default in place.
    pub mode: Option<DisplayMode>,
    pub tools: bool,
    pub user: Option<String>,
    pub no_color: bool,
}

impl TurnArgs {
    pub fn resolve(&self) -> Result<ResolvedTurn, String> {
        let profile = match self.profile.as_deref() {
            Some(name) => config::load_profile(name)?,
            None => ProfileConfig::default(),
        };
        self.resolve_with(&profile, |key| env::var(key).ok())
    }

    /// Precedence is flag, then environment, then profile, then default.
    pub fn resolve_with(
        &self,
        profile: &ProfileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ResolvedTurn, String> {
        let env = |key: &str| {
            env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = TurnOptions::default();

        let api = match (&self.api, env("MC_API"), &profile.api) {
            (Some(api), _, _) => parse_api(api, "--api")?,
            (None, Some(api), _) => parse_api(&api, "MC_API")?,
            (None, None, Some(api)) => parse_api(api, "profile api")?,
            (None, None, None) => defaults.api,
        };

        let model = self
            .model
            .clone()
            .or_else(|| env("MC_MODEL"))
            .or_else(|| profile.model.clone())
            .unwrap_or(defaults.model);

        let reasoning_effort = match (
            &self.reasoning_effort,
            env("MC_REASONING_EFFORT"),
            &profile.reasoning_effort,
        ) {
            (Some(effort), _, _) => parse_effort(effort, "--reasoning-effort")?,
            (None, Some(effort), _) => parse_effort(&effort, "MC_REASONING_EFFORT")?,
            (None, None, Some(effort)) => parse_effort(effort, "profile reasoning_effort")?,
            (None, None, None) => defaults.reasoning_effort.unwrap_or_default(),
        };

        let timeout_secs = match (self.timeout, env("MC_TIMEOUT")) {
            (Some(timeout), _) => Some(timeout),
            (None, Some(raw)) => Some(raw.parse::<u64>().map_err(|_| {
                format!("Invalid MC_TIMEOUT '{raw}'. Expected a whole number of seconds.")
            })?),
            (None, None) => profile.timeout,
        };

        let system = self
            .system
            .clone()
            .or_else(|| env("MC_SYSTEM"))
            .or_else(|| profile.system.clone());

        let mode = match (self.mode, &profile.mode) {
            (Some(mode), _) => Some(mode),
            (None, Some(mode)) => Some(DisplayMode::parse(mode).ok_or_else(|| {
                format!("Invalid profile mode '{mode}'. Supported values: clean, verbose, debug.")
            })?),
            (None, None) => None,
        };

        Ok(ResolvedTurn {
            options: TurnOptions {
                api,
                model,
                reasoning_effort: Some(reasoning_effort),
                reasoning_summary: profile
                    .reasoning_summary
                    .clone()
                    .unwrap_or(defaults.reasoning_summary),
                store: !self.no_store && profile.store.unwrap_or(defaults.store),
                timeout_secs,
            },
            system,
            mode,
            tools: !self.no_tools && profile.tools.unwrap_or(true),
            user: self.user.clone().or_else(|| profile.user_id.clone()),
            no_color: self.no_color,
        })
    }
}

fn parse_api(value: &str, source: &str) -> Result<ApiKind, String> {
    ApiKind::parse(value)
        .ok_or_else(|| format!("Invalid {source} '{value}'. Supported values: responses, chat."))
}

fn parse_effort(value: &str, source: &str) -> Result<ReasoningEffort, String> {
    ReasoningEffort::parse(value)
        .ok_or_else(|| format!("Invalid {source} '{value}'. Supported values: low, medium, high."))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::TurnArgs;
    use crate::config::ProfileConfig;
    use crate::display::DisplayMode;
    use crate::llm::{ApiKind, ReasoningEffort};

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_flags_env_or_profile() {
        let resolved = TurnArgs::default()
            .resolve_with(&ProfileConfig::default(), env_from(&[]))
            .expect("resolves");
        assert_eq!(resolved.options.api, ApiKind::Responses);
        assert_eq!(resolved.options.model, "o3");
        assert_eq!(resolved.options.reasoning_effort, Some(ReasoningEffort::Medium));
        assert_eq!(resolved.options.reasoning_summary, "auto");
        assert!(resolved.options.store);
        assert!(resolved.tools);
        assert_eq!(resolved.mode, None);
    }

    #[test]
    fn flag_beats_env_beats_profile() {
        let profile = ProfileConfig {
            model: Some("gpt-4o".to_string()),
            timeout: Some(7),
            api: Some("chat".to_string()),
            ..ProfileConfig::default()
        };
        let env = env_from(&[("MC_MODEL", "o3-mini"), ("MC_TIMEOUT", "21")]);

        let from_env = TurnArgs::default().resolve_with(&profile, &env).expect("resolves");
        assert_eq!(from_env.options.model, "o3-mini");
        assert_eq!(from_env.options.timeout_secs, Some(21));
        assert_eq!(from_env.options.api, ApiKind::ChatCompletions);

        let args = TurnArgs {
            model: Some("o4-mini".to_string()),
            timeout: Some(33),
            ..TurnArgs::default()
        };
        let from_flags = args.resolve_with(&profile, &env).expect("resolves");
        assert_eq!(from_flags.options.model, "o4-mini");
        assert_eq!(from_flags.options.timeout_secs, Some(33));
    }

    #[test]
    fn profile_toggles_and_flags_combine() {
        let profile = ProfileConfig {
            store: Some(true),
            tools: Some(false),
            mode: Some("debug".to_string()),
            user_id: Some("mailbox@example.com".to_string()),
            ..ProfileConfig::default()
        };
        let args = TurnArgs {
            no_store: true,
            ..TurnArgs::default()
        };
        let resolved = args.resolve_with(&profile, env_from(&[])).expect("resolves");
        assert!(!resolved.options.store);
        assert!(!resolved.tools);
        assert_eq!(resolved.mode, Some(DisplayMode::Debug));
        assert_eq!(resolved.user.as_deref(), Some("mailbox@example.com"));
    }

    #[test]
    fn invalid_env_values_are_reported() {
        let err = TurnArgs::default()
            .resolve_with(&ProfileConfig::default(), env_from(&[("MC_API", "soap")]))
            .expect_err("bad api");
        assert_eq!(err, "Invalid MC_API 'soap'. Supported values: responses, chat.");

        let err = TurnArgs::default()
            .resolve_with(&ProfileConfig::default(), env_from(&[("MC_TIMEOUT", "soon")]))
            .expect_err("bad timeout");
        assert!(err.contains("Invalid MC_TIMEOUT 'soon'"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let resolved = TurnArgs::default()
            .resolve_with(&ProfileConfig::default(), env_from(&[("MC_MODEL", "  ")]))
            .expect("resolves");
        assert_eq!(resolved.options.model, "o3");
    }
}
