use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::graph::{GraphError, GraphSettings};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Requests an app-only token with the client-credentials grant.
///
/// Every call goes to the token endpoint; tokens are not cached.
pub async fn fetch_token(
    http: &reqwest::Client,
    settings: &GraphSettings,
    timeout: Duration,
) -> Result<String, GraphError> {
    let url = settings.token_url();
    debug!(tenant = %settings.tenant_id, "requesting graph token");

    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", settings.client_id.as_str()),
        ("client_secret", settings.client_secret.as_str()),
        ("scope", settings.scope.as_str()),
    ];

    let response = http
        .post(&url)
        .form(&params)
        .timeout(timeout)
        .send()
        .await
        .map_err(GraphError::TokenRequest)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(GraphError::Token { status, body });
    }

    let token: TokenResponse = response.json().await.map_err(GraphError::TokenRequest)?;
    token
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(GraphError::TokenMissing)
}
