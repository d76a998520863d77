//! Shared HTTP plumbing for the service adapters.
//!
//! Every adapter owns a `reqwest::Client` built by [`client_with_timeout`]
//! and maps transport failures into [`HttpError`].

use std::time::Duration;

use thiserror::Error;

/// Header carrying the resource key on Azure Cognitive Services endpoints.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Errors that can occur while talking to a remote service.
#[derive(Debug, Error)]
pub enum HttpError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be parsed as expected JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// The request URL is dropped from the message: some services carry their
/// key as a query parameter.
impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            HttpError::Timeout
        } else if e.is_decode() {
            HttpError::Parse(e.to_string())
        } else {
            HttpError::Request(e.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(e: serde_json::Error) -> Self {
        HttpError::Parse(e.to_string())
    }
}

/// Build a client with a per-request timeout.
///
/// Falls back to a default client if the builder fails.
pub fn client_with_timeout(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Turn a non-2xx response into [`HttpError::Status`], keeping the body for
/// diagnostics.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HttpError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Join `base` and `path` with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
