use std::env;

use serde_json::Value;
use tracing::debug;

use crate::llm::conversation::Conversation;
use crate::llm::provider::{
    API_KEY_ENV, ApiKind, LlmError, Turn, TurnOptions, api_key_with, base_url_with,
};
use crate::llm::runtime::{RequestFailure, post_json};
use crate::llm::tools::ToolDefinition;
use crate::llm::{chat_completions, responses};

/// Builds the request body for `options.api` without sending it.
pub fn request_body(
    conversation: &Conversation,
    tools: &[ToolDefinition],
    options: &TurnOptions,
) -> Value {
    match options.api {
        ApiKind::Responses => responses::request_body(conversation, tools, options),
        ApiKind::ChatCompletions => chat_completions::request_body(conversation, tools, options),
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Reads `OPENAI_API_KEY` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub fn from_env_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let api_key = api_key_with(&env).ok_or(LlmError::MissingApiKey {
            key_env: API_KEY_ENV,
        })?;
        Ok(Self::new(base_url_with(&env), api_key))
    }

    pub fn endpoint(&self, api: ApiKind) -> String {
        format!("{}{}", self.base_url, api.path())
    }

    /// Sends the whole conversation and parses the reply.
    pub async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolDefinition],
        options: &TurnOptions,
    ) -> Result<Turn, LlmError> {
        let api = options.api.as_str();
        let url = self.endpoint(options.api);
        let payload = request_body(conversation, tools, options);
        debug!(
            api,
            model = %options.model,
            items = conversation.len(),
            tools = tools.len(),
            "sending turn"
        );

        let response = post_json(&self.http, &url, &self.api_key, &payload, options.timeout_secs)
            .await
            .map_err(|failure| match failure {
                RequestFailure::Request(source) => LlmError::Request { api, source },
                RequestFailure::Api { status, body } => LlmError::Api { api, status, body },
            })?;

        let raw: Value = response
            .json()
            .await
            .map_err(|source| LlmError::Request { api, source })?;

        Ok(match options.api {
            ApiKind::Responses => responses::parse_turn(raw),
            ApiKind::ChatCompletions => chat_completions::parse_turn(raw),
        })
    }
}
