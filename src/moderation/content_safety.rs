//! [`Moderator`] trait and the content-safety REST implementation.
//!
//! Unlike entity extraction, moderation failures are surfaced to the caller:
//! the turn cannot proceed without a verdict.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppConfig;
use crate::http::{client_with_timeout, join_url, HttpError, SUBSCRIPTION_KEY_HEADER};
use crate::moderation::verdict::{AnalyzeTextResponse, ErrorEnvelope, ModerationVerdict};

const API_VERSION: &str = "2023-10-01";
const CATEGORIES: [&str; 4] = ["Hate", "SelfHarm", "Sexual", "Violence"];

// ---------------------------------------------------------------------------
// ModerationError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ModerationError {
    /// The service rejected the request with a structured error.
    #[error("content safety error {code}: {message}")]
    Service { code: String, message: String },

    #[error(transparent)]
    Http(#[from] HttpError),
}

impl From<reqwest::Error> for ModerationError {
    fn from(e: reqwest::Error) -> Self {
        ModerationError::Http(e.into())
    }
}

// ---------------------------------------------------------------------------
// Moderator trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Moderator: Send + Sync {
    /// Classify non-empty `text` across the four harm categories.
    async fn analyze(&self, text: &str) -> Result<ModerationVerdict, ModerationError>;

    /// `true` when any category has a non-zero severity.
    async fn is_unsafe(&self, text: &str) -> Result<bool, ModerationError> {
        Ok(self.analyze(text).await?.is_blocked())
    }
}

// ---------------------------------------------------------------------------
// ContentSafetyModerator
// ---------------------------------------------------------------------------

pub struct ContentSafetyModerator {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl ContentSafetyModerator {
    pub fn from_config(config: &AppConfig) -> Self {
        let cs = &config.content_safety;
        Self {
            client: client_with_timeout(cs.timeout_secs),
            url: join_url(
                &cs.endpoint,
                &format!("contentsafety/text:analyze?api-version={API_VERSION}"),
            ),
            key: cs.key.clone().unwrap_or_default(),
        }
    }

    async fn request(&self, text: &str) -> Result<ModerationVerdict, ModerationError> {
        let body = serde_json::json!({
            "text": text,
            "categories": CATEGORIES,
        });

        let response = self
            .client
            .post(&self.url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(service_error(status.as_u16(), raw));
        }

        let parsed: AnalyzeTextResponse = serde_json::from_str(&raw).map_err(HttpError::from)?;
        Ok(parsed.into())
    }
}

/// Prefer the structured `{"error": {code, message}}` body; fall back to the
/// raw status otherwise.
fn service_error(status: u16, body: String) -> ModerationError {
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => ModerationError::Service {
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => ModerationError::Http(HttpError::Status { status, body }),
    }
}

#[async_trait]
impl Moderator for ContentSafetyModerator {
    async fn analyze(&self, text: &str) -> Result<ModerationVerdict, ModerationError> {
        let result = self.request(text).await;
        match &result {
            Ok(verdict) => log::debug!("moderation: {verdict:?}"),
            Err(e) => {
                log::error!("Analyze text failed.");
                if let ModerationError::Service { code, message } = e {
                    log::error!("Error code: {code}");
                    log::error!("Error message: {message}");
                } else {
                    log::error!("{e}");
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_targets_text_analyze() {
        let mut config = AppConfig::default();
        config.content_safety.endpoint = "https://safety.example.com/".into();
        let m = ContentSafetyModerator::from_config(&config);
        assert_eq!(
            m.url,
            "https://safety.example.com/contentsafety/text:analyze?api-version=2023-10-01"
        );
    }

    #[test]
    fn structured_error_body_becomes_service_error() {
        let err = service_error(
            400,
            r#"{"error":{"code":"InvalidRequestBody","message":"Text is empty."}}"#.into(),
        );
        match err {
            ModerationError::Service { code, message } => {
                assert_eq!(code, "InvalidRequestBody");
                assert_eq!(message, "Text is empty.");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn unstructured_error_body_keeps_status() {
        let err = service_error(502, "Bad Gateway".into());
        assert!(matches!(
            err,
            ModerationError::Http(HttpError::Status { status: 502, .. })
        ));
    }

    struct Fixed(ModerationVerdict);

    #[async_trait]
    impl Moderator for Fixed {
        async fn analyze(&self, _text: &str) -> Result<ModerationVerdict, ModerationError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn is_unsafe_reduces_verdict() {
        let safe = Fixed(ModerationVerdict {
            hate: Some(0),
            ..ModerationVerdict::default()
        });
        let unsafe_ = Fixed(ModerationVerdict {
            sexual: Some(4),
            ..ModerationVerdict::default()
        });
        assert!(!safe.is_unsafe("hola").await.unwrap());
        assert!(unsafe_.is_unsafe("hola").await.unwrap());
    }
}
