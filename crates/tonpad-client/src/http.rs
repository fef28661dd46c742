//! Shared reqwest plumbing.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tonpad_core::error::ProviderError;

pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .expect("build reqwest client")
}

pub(crate) fn transport(err: reqwest::Error) -> ProviderError {
    ProviderError::Transport(err.to_string())
}

/// Fail on a non-2xx status, keeping the response body as the message.
pub(crate) async fn check_status(resp: Response) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

/// GET a URL and decode its JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, ProviderError> {
    let resp = client.get(url).send().await.map_err(transport)?;
    let resp = check_status(resp).await?;
    resp.json()
        .await
        .map_err(|e| ProviderError::Decode(e.to_string()))
}
