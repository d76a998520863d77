//! Thin client for the Language service's `analyze-text` API, shared by the
//! entity extractor and the summarizer.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::http::{client_with_timeout, ensure_success, join_url, HttpError, SUBSCRIPTION_KEY_HEADER};

pub(crate) const API_VERSION: &str = "2023-04-01";

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("job submission returned no operation-location header")]
    MissingOperationLocation,

    #[error("analysis job ended with status {0}")]
    JobFailed(String),

    #[error("analysis job still running after {0} polls")]
    JobTimedOut(u32),
}

impl From<reqwest::Error> for LanguageError {
    fn from(e: reqwest::Error) -> Self {
        LanguageError::Http(e.into())
    }
}

/// `{ "code": ..., "message": ... }` as used in per-document errors.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServiceError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentError {
    #[serde(default)]
    pub id: String,
    pub error: ServiceError,
}

pub struct LanguageClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    document_language: String,
    pub(crate) summary_sentence_count: u32,
    pub(crate) poll_interval: Duration,
    pub(crate) max_polls: u32,
}

impl LanguageClient {
    pub fn from_config(config: &AppConfig) -> Self {
        let lang = &config.language;
        Self {
            client: client_with_timeout(lang.timeout_secs),
            endpoint: lang.endpoint.clone(),
            key: lang.key.clone().unwrap_or_default(),
            document_language: config.assistant.document_language.clone(),
            summary_sentence_count: lang.summary_sentence_count,
            poll_interval: Duration::from_millis(lang.poll_interval_ms),
            max_polls: lang.max_polls,
        }
    }

    /// Single-document `analysisInput` with id `"1"`.
    pub(crate) fn analysis_input(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "documents": [
                { "id": "1", "language": self.document_language, "text": text }
            ]
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        join_url(
            &self.endpoint,
            &format!("{path}?api-version={API_VERSION}"),
        )
    }

    /// POST `body` and decode the JSON answer.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, LanguageError> {
        let response = self.post(path, body).await?;
        Ok(response.json::<T>().await?)
    }

    /// POST `body` and return the successful response untouched.
    pub(crate) async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, LanguageError> {
        let response = self
            .client
            .post(self.url(path))
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .json(body)
            .send()
            .await?;
        Ok(ensure_success(response).await?)
    }

    /// GET an absolute URL (e.g. an `operation-location`) and decode it.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, LanguageError> {
        let response = self
            .client
            .get(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LanguageClient {
        let mut config = AppConfig::default();
        config.language.endpoint = "https://lang.example.com/".into();
        LanguageClient::from_config(&config)
    }

    #[test]
    fn url_appends_api_version() {
        assert_eq!(
            client().url("language/:analyze-text"),
            "https://lang.example.com/language/:analyze-text?api-version=2023-04-01"
        );
    }

    #[test]
    fn analysis_input_uses_document_language() {
        let input = client().analysis_input("Marie Curie");
        assert_eq!(input["documents"][0]["id"], "1");
        assert_eq!(input["documents"][0]["language"], "es");
        assert_eq!(input["documents"][0]["text"], "Marie Curie");
    }

    #[test]
    fn poll_settings_come_from_config() {
        let c = client();
        assert_eq!(c.summary_sentence_count, 4);
        assert_eq!(c.poll_interval, Duration::from_millis(500));
        assert_eq!(c.max_polls, 60);
    }
}
