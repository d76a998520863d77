//! Extractive summarization of a biography.
//!
//! The Language service runs summarization as a long-running job: the
//! request is submitted to `analyze-text/jobs`, the `operation-location`
//! header names the job, and the job is polled until it reaches a terminal
//! status.  Only the first extracted sentence is kept.
//!
//! [`Summarizer::summarize`] never fails.  When nothing usable comes back it
//! returns [`SUMMARY_FALLBACK`], which callers must treat as "no summary".

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::language::client::{DocumentError, LanguageClient, LanguageError, ServiceError};

/// Returned by [`Summarizer::summarize`] when no sentence could be extracted.
pub const SUMMARY_FALLBACK: &str = "No se encontró un resumen adecuado.";

const TASK_NAME: &str = "biography-summary";

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, document: &str) -> String;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct JobState {
    pub status: String,
    #[serde(default)]
    pub errors: Vec<ServiceError>,
    #[serde(default)]
    pub tasks: Option<JobTasks>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobTasks {
    #[serde(default)]
    pub items: Vec<TaskItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskItem {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: Option<SummaryResults>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryResults {
    #[serde(default)]
    pub documents: Vec<SummaryDocument>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryDocument {
    #[serde(default)]
    pub sentences: Vec<SummarySentence>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummarySentence {
    pub text: String,
}

/// Where a job status sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobPhase {
    Running,
    Done,
    Failed,
}

pub(crate) fn job_phase(status: &str) -> JobPhase {
    match status {
        "succeeded" | "partiallySucceeded" | "partiallyCompleted" => JobPhase::Done,
        "failed" | "cancelled" | "cancelling" => JobPhase::Failed,
        _ => JobPhase::Running,
    }
}

/// First non-empty sentence of the first task result that did not error.
pub(crate) fn first_summary_sentence(job: &JobState) -> Option<String> {
    for err in &job.errors {
        log::warn!("Error: {} {}", err.code, err.message);
    }

    let items = job.tasks.as_ref().map(|t| t.items.as_slice()).unwrap_or(&[]);
    for item in items {
        if item.status == "failed" {
            log::warn!("Error: summarization task failed");
            continue;
        }
        let Some(results) = &item.results else {
            continue;
        };
        for err in &results.errors {
            log::warn!("Error: {} {}", err.error.code, err.error.message);
        }
        let sentence = results
            .documents
            .iter()
            .flat_map(|d| d.sentences.iter())
            .map(|s| s.text.trim())
            .find(|s| !s.is_empty());
        if let Some(s) = sentence {
            return Some(s.to_string());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// LanguageSummarizer
// ---------------------------------------------------------------------------

pub struct LanguageSummarizer {
    client: Arc<LanguageClient>,
}

impl LanguageSummarizer {
    pub fn new(client: Arc<LanguageClient>) -> Self {
        Self { client }
    }

    fn job_body(&self, document: &str) -> serde_json::Value {
        serde_json::json!({
            "displayName": "Alessandro biography summary",
            "analysisInput": self.client.analysis_input(document),
            "tasks": [{
                "kind": "ExtractiveSummarization",
                "taskName": TASK_NAME,
                "parameters": { "sentenceCount": self.client.summary_sentence_count },
            }],
        })
    }

    async fn submit(&self, document: &str) -> Result<String, LanguageError> {
        let response = self
            .client
            .post("language/analyze-text/jobs", &self.job_body(document))
            .await?;
        response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(LanguageError::MissingOperationLocation)
    }

    async fn wait_for(&self, operation: &str) -> Result<JobState, LanguageError> {
        for poll in 0..self.client.max_polls {
            if poll > 0 {
                tokio::time::sleep(self.client.poll_interval).await;
            }
            let job: JobState = self.client.get_json(operation).await?;
            match job_phase(&job.status) {
                JobPhase::Done => return Ok(job),
                JobPhase::Failed => {
                    for err in &job.errors {
                        log::warn!("Error: {} {}", err.code, err.message);
                    }
                    return Err(LanguageError::JobFailed(job.status));
                }
                JobPhase::Running => log::debug!("summary job {}: {}", poll + 1, job.status),
            }
        }
        Err(LanguageError::JobTimedOut(self.client.max_polls))
    }

    async fn extract(&self, document: &str) -> Result<Option<String>, LanguageError> {
        let operation = self.submit(document).await?;
        let job = self.wait_for(&operation).await?;
        Ok(first_summary_sentence(&job))
    }
}

#[async_trait]
impl Summarizer for LanguageSummarizer {
    async fn summarize(&self, document: &str) -> String {
        log::info!("Texto original: {document}");

        match self.extract(document).await {
            Ok(Some(sentence)) => {
                log::info!("Resumen: {sentence}");
                sentence
            }
            Ok(None) => SUMMARY_FALLBACK.to_string(),
            Err(e) => {
                log::warn!("Error: {e}");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(value: serde_json::Value) -> JobState {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn terminal_statuses() {
        assert_eq!(job_phase("notStarted"), JobPhase::Running);
        assert_eq!(job_phase("running"), JobPhase::Running);
        assert_eq!(job_phase("succeeded"), JobPhase::Done);
        assert_eq!(job_phase("partiallyCompleted"), JobPhase::Done);
        assert_eq!(job_phase("failed"), JobPhase::Failed);
        assert_eq!(job_phase("cancelled"), JobPhase::Failed);
    }

    #[test]
    fn takes_first_sentence_of_successful_job() {
        let state = job(json!({
            "jobId": "c0ffee",
            "status": "succeeded",
            "errors": [],
            "tasks": {
                "completed": 1, "failed": 0, "inProgress": 0, "total": 1,
                "items": [{
                    "kind": "ExtractiveSummarizationLROResults",
                    "taskName": "biography-summary",
                    "status": "succeeded",
                    "results": {
                        "documents": [{
                            "id": "1",
                            "sentences": [
                                { "text": "Marie Curie fue una física y química polaca.", "rankScore": 1.0, "offset": 0, "length": 44 },
                                { "text": "Fue la primera persona en recibir dos premios Nobel.", "rankScore": 0.8, "offset": 45, "length": 52 }
                            ],
                            "warnings": []
                        }],
                        "errors": [],
                        "modelVersion": "2023-02-01"
                    }
                }]
            }
        }));
        assert_eq!(
            first_summary_sentence(&state).as_deref(),
            Some("Marie Curie fue una física y química polaca.")
        );
    }

    #[test]
    fn skips_failed_task_items() {
        let state = job(json!({
            "status": "partiallyCompleted",
            "tasks": {
                "items": [
                    { "status": "failed" },
                    {
                        "status": "succeeded",
                        "results": {
                            "documents": [{ "sentences": [{ "text": "Segunda." }] }]
                        }
                    }
                ]
            }
        }));
        assert_eq!(first_summary_sentence(&state).as_deref(), Some("Segunda."));
    }

    #[test]
    fn document_errors_yield_nothing() {
        let state = job(json!({
            "status": "succeeded",
            "tasks": {
                "items": [{
                    "status": "succeeded",
                    "results": {
                        "documents": [],
                        "errors": [{
                            "id": "1",
                            "error": { "code": "InvalidArgument", "message": "Invalid document." }
                        }]
                    }
                }]
            }
        }));
        assert_eq!(first_summary_sentence(&state), None);
    }

    #[test]
    fn blank_sentences_are_ignored() {
        let state = job(json!({
            "status": "succeeded",
            "tasks": {
                "items": [{
                    "status": "succeeded",
                    "results": { "documents": [{ "sentences": [{ "text": "  " }] }] }
                }]
            }
        }));
        assert_eq!(first_summary_sentence(&state), None);
    }

    #[test]
    fn job_body_requests_configured_sentence_count() {
        let mut config = crate::config::AppConfig::default();
        config.language.endpoint = "https://lang.example.com".into();
        let summarizer = LanguageSummarizer::new(Arc::new(LanguageClient::from_config(&config)));
        let body = summarizer.job_body("texto");
        assert_eq!(body["tasks"][0]["kind"], "ExtractiveSummarization");
        assert_eq!(body["tasks"][0]["parameters"]["sentenceCount"], 4);
        assert_eq!(body["analysisInput"]["documents"][0]["text"], "texto");
    }

    #[tokio::test]
    async fn unreachable_service_returns_fallback() {
        let mut config = crate::config::AppConfig::default();
        config.language.endpoint = "http://127.0.0.1:9".into();
        config.language.timeout_secs = 2;
        let summarizer = LanguageSummarizer::new(Arc::new(LanguageClient::from_config(&config)));
        assert_eq!(summarizer.summarize("Marie Curie fue...").await, SUMMARY_FALLBACK);
    }
}
