//! HTTP utilities for Auth0 Management API calls

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Truncate a response body and drop control characters before it is logged
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// HTTP client wrapper for Management API calls
#[derive(Clone)]
pub struct Auth0HttpClient {
    client: Client,
}

impl Auth0HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("auth0-tfgen/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request and parse the JSON body
    pub async fn get(&self, url: &Url, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(anyhow::anyhow!(
                "API request failed: {}{}",
                status,
                api_error_message(&body)
                    .map(|m| format!(" ({})", m))
                    .unwrap_or_default()
            ));
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

/// Pull the human-readable `message` out of an Auth0 error envelope
///
/// Auth0 errors look like `{"statusCode":403,"error":"Forbidden","message":"..."}`.
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?;
    let sanitized: String = message
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_LOG_BODY_LENGTH)
        .collect();
    (!sanitized.is_empty()).then_some(sanitized)
}
