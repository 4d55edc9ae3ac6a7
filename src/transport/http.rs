//! Bundled HTTP transport over `reqwest` for endpoint targets.

use super::HttpTransport;
use crate::error::{RelayError, Result};
use std::time::Duration;
use tracing::debug;

/// `reqwest`-backed [`HttpTransport`] with a whole-request timeout.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RelayError::Configuration(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        debug!(%url, "posting endpoint request");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_reqwest_error)?;

        if !status.is_success() {
            return Err(RelayError::Configuration(format!(
                "endpoint returned {status}: {}",
                truncate(&text, 200)
            )));
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        // Non-JSON bodies come back as a JSON string rather than failing.
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }
}

/// Timeouts and connect failures are transient; protocol-level failures are
/// terminal.
fn classify_reqwest_error(error: reqwest::Error) -> RelayError {
    if error.is_timeout() {
        RelayError::transient(format!("endpoint call timed out: {error}"))
    } else if error.is_connect() {
        RelayError::transient(format!("endpoint connection failed: {error}"))
    } else {
        RelayError::Configuration(format!("endpoint call failed: {error}"))
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 2), "he");
    }
}
