//! Authenticated JSON GET against the upstream API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::ClientError;

/// Longest response body excerpt kept in error messages.
const ERROR_BODY_LIMIT: usize = 512;

/// Performs one GET request and decodes the JSON body.
///
/// Implementations do no pacing of their own; `RoyaleClient` paces every call
/// before handing it to the transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &'static str;

    async fn get_json(&self, url: &Url) -> Result<Value, ClientError>;
}

/// reqwest-backed transport carrying the bearer credential.
pub struct HttpTransport {
    client: Client,
    token: String,
}

impl HttpTransport {
    pub fn new(token: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("royale-meta/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            token: token.trim().to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get_json(&self, url: &Url) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(1);

            return Err(ClientError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                message: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
