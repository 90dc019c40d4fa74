use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::graph::auth::fetch_token;
use crate::graph::functions::{MailboxFunction, not_implemented};
use crate::graph::request::{GraphRequest, Method};
use crate::graph::{GraphError, GraphSettings};

/// Applied to the token request and to each Graph call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    settings: GraphSettings,
    timeout: Duration,
}

impl GraphClient {
    pub fn new(settings: GraphSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn from_env() -> Result<Self, GraphError> {
        Ok(Self::new(GraphSettings::from_env()?))
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Sets the mailbox used when a call has no `userId`.
    pub fn set_default_user(&mut self, user: Option<String>) {
        if user.is_some() {
            self.settings.default_user = user;
        }
    }

    /// Dispatches a model function call by name.
    ///
    /// Always yields a JSON value for the model: failures of any kind are
    /// reported as `{"error": ...}` rather than aborting the turn.
    pub async fn call(&self, name: &str, args: &Value) -> Value {
        let Some(function) = MailboxFunction::from_name(name) else {
            warn!(function = name, "model requested an unknown function");
            return not_implemented(name);
        };

        let request = match function.plan(args, self.settings.default_user.as_deref()) {
            Ok(request) => request,
            Err(err) => {
                warn!(function = name, error = %err, "could not build graph request");
                return json!({ "error": err.to_string() });
            }
        };

        match self.execute(&request).await {
            Ok(value) => value,
            Err(err) => {
                warn!(function = name, error = %err, "graph call failed");
                json!({ "error": err.to_string() })
            }
        }
    }

    /// Fetches a token and runs one planned request.
    pub async fn execute(&self, request: &GraphRequest) -> Result<Value, GraphError> {
        let token = fetch_token(&self.http, &self.settings, self.timeout).await?;
        let url = request.url(&self.settings.api_base);
        debug!(method = request.method.as_str(), %url, "graph request");

        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Patch => self.http.patch(&url),
        };
        builder = builder.bearer_auth(&token).timeout(self.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(GraphError::Request)?;
        let status = response.status();
        let body = response.text().await.map_err(GraphError::Request)?;
        debug!(status = status.as_u16(), bytes = body.len(), "graph response");
        Ok(request.shape(status, &body))
    }
}
