use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;

#[derive(Debug)]
pub(crate) enum RequestFailure {
    Request(reqwest::Error),
    Api { status: StatusCode, body: String },
}

/// Sends one authenticated JSON POST. Failures are returned as-is; nothing is retried.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    payload: &T,
    timeout_secs: Option<u64>,
) -> Result<reqwest::Response, RequestFailure> {
    let mut request = client.post(url).bearer_auth(api_key).json(payload);

    if let Some(timeout_secs) = timeout_secs {
        request = request.timeout(Duration::from_secs(timeout_secs));
    }

    let response = request.send().await.map_err(RequestFailure::Request)?;
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(RequestFailure::Api { status, body })
}
