//! Shared HTTP plumbing for the provider adapters

use super::ProviderError;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("nameforge/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<Client, ProviderError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| ProviderError::NotConfigured {
            provider: provider.to_string(),
            reason: format!("HTTP client build failed: {}", e),
        })
}

pub(crate) fn map_send_error(provider: &str, timeout: Duration, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_string(),
            after_ms: timeout.as_millis() as u64,
        }
    } else {
        ProviderError::Network {
            provider: provider.to_string(),
            message: e.to_string(),
        }
    }
}

/// Check status and decode the JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    response.json::<T>().await.map_err(|e| ProviderError::Parse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}
