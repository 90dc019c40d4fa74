use std::env;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::llm::tools::ToolCall;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Wire format used for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiKind {
    #[default]
    Responses,
    ChatCompletions,
}

impl ApiKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Responses => "responses",
            Self::ChatCompletions => "chat",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "responses" => Some(Self::Responses),
            "chat" | "chat-completions" | "chat_completions" => Some(Self::ChatCompletions),
            _ => None,
        }
    }

    /// Path appended to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Responses => "/responses",
            Self::ChatCompletions => "/chat/completions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningEffort {
    Low,
    #[default]
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnOptions {
    pub api: ApiKind,
    pub model: String,
    /// Only sent with the Responses API.
    pub reasoning_effort: Option<ReasoningEffort>,
    pub reasoning_summary: String,
    pub store: bool,
    pub timeout_secs: Option<u64>,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            api: ApiKind::Responses,
            model: "o3".to_string(),
            reasoning_effort: Some(ReasoningEffort::Medium),
            reasoning_summary: "auto".to_string(),
            store: true,
            timeout_secs: None,
        }
    }
}

/// One model response, parsed into the parts the chat loop acts on.
#[derive(Debug, Clone)]
pub struct Turn {
    /// The response body exactly as returned, used for rendering.
    pub raw: Value,
    pub text: Option<String>,
    pub reasoning: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{key_env} is not set in the environment")]
    MissingApiKey { key_env: &'static str },
    #[error("{api} request failed: {source}")]
    Request {
        api: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{api} API error {status}: {body}")]
    Api {
        api: &'static str,
        status: StatusCode,
        body: String,
    },
}

pub fn is_api_key_present() -> bool {
    api_key_with(|key| env::var(key).ok()).is_some()
}

pub fn base_url_from_env() -> String {
    base_url_with(|key| env::var(key).ok())
}

/// `OPENAI_API_KEY` from `env`, ignoring blank values.
pub fn api_key_with(env: impl Fn(&str) -> Option<String>) -> Option<String> {
    env(API_KEY_ENV)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn base_url_with(env: impl Fn(&str) -> Option<String>) -> String {
    env(BASE_URL_ENV)
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}
