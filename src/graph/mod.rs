//! Mailbox functions backed by Microsoft Graph.
//!
//! A function call from the model is turned into a [`GraphRequest`] plan by
//! [`functions`], then executed by [`GraphClient`] with a freshly fetched
//! client-credentials token.

pub mod auth;
pub mod client;
pub mod functions;
pub mod request;

use std::env;

use reqwest::StatusCode;
use thiserror::Error;

pub use client::GraphClient;
pub use functions::MailboxFunction;
pub use request::{GraphRequest, Method};

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
pub const DEFAULT_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// App registration and endpoint settings for Graph.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub authority: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub api_base: String,
    /// Mailbox used when a call does not name one.
    pub default_user: Option<String>,
}

impl GraphSettings {
    /// Reads `TENANT_ID`, `CLIENT_ID`, `CLIENT_SECRET` and the optional
    /// `GRAPH_*` overrides.
    pub fn from_env() -> Result<Self, GraphError> {
        Self::from_env_with(process_env)
    }

    pub fn from_env_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, GraphError> {
        let env = trimmed(env);
        let required = |key: &'static str| env(key).ok_or(GraphError::MissingSetting(key));
        Ok(Self {
            authority: env("GRAPH_AUTHORITY").unwrap_or_else(|| DEFAULT_AUTHORITY.to_string()),
            tenant_id: required("TENANT_ID")?,
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            scope: env("GRAPH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            api_base: api_base_with(&env),
            default_user: env("GRAPH_USER_ID"),
        })
    }

    /// True when the three credential variables are all set.
    pub fn is_configured() -> bool {
        Self::is_configured_with(process_env)
    }

    pub fn is_configured_with(env: impl Fn(&str) -> Option<String>) -> bool {
        let env = trimmed(env);
        CREDENTIAL_KEYS.iter().all(|key| env(key).is_some())
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

/// `GRAPH_API_BASE`, or the public v1.0 endpoint.
pub fn api_base_from_env() -> String {
    api_base_with(&trimmed(process_env))
}

pub fn default_user_from_env() -> Option<String> {
    trimmed(process_env)("GRAPH_USER_ID")
}

const CREDENTIAL_KEYS: [&str; 3] = ["TENANT_ID", "CLIENT_ID", "CLIENT_SECRET"];

fn api_base_with(env: &impl Fn(&str) -> Option<String>) -> String {
    env("GRAPH_API_BASE")
        .map(|base| base.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Wraps a lookup so blank values count as unset.
fn trimmed(env: impl Fn(&str) -> Option<String>) -> impl Fn(&str) -> Option<String> {
    move |key| {
        env(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("{0} is not set in the environment")]
    MissingSetting(&'static str),
    #[error("Graph token request failed: {0}")]
    TokenRequest(#[source] reqwest::Error),
    #[error("Error getting token: {status} - {body}")]
    Token { status: StatusCode, body: String },
    #[error("Token response did not contain an access_token")]
    TokenMissing,
    #[error("Graph request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Missing required argument '{argument}' for {function}")]
    MissingArgument {
        function: &'static str,
        argument: &'static str,
    },
    #[error("Invalid argument '{argument}' for {function}: {reason}")]
    InvalidArgument {
        function: &'static str,
        argument: &'static str,
        reason: String,
    },
    #[error("No mailbox given: pass userId or set GRAPH_USER_ID")]
    NoMailbox,
}
