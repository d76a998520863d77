//! Person-name extraction via named entity recognition.
//!
//! [`EntityExtractor::find_person`] returns the first entity the service tags
//! as `Person`, in the order the service lists them.  No ranking by length
//! or confidence is applied.  Failures are logged and reported as "no
//! person", so an outage here ends the turn with the out-of-scope apology
//! rather than an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::language::client::{DocumentError, LanguageClient, LanguageError};

pub const PERSON_CATEGORY: &str = "Person";

#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Name of the first person mentioned in `text`, if any.
    async fn find_person(&self, text: &str) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct EntityRecognitionResponse {
    pub results: EntityResults,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityResults {
    #[serde(default)]
    pub documents: Vec<EntityDocument>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityDocument {
    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Entity {
    pub text: String,
    pub category: String,
}

/// First-match selection over the single analysed document.
pub(crate) fn first_person(response: EntityRecognitionResponse) -> Result<Option<String>, String> {
    if let Some(err) = response.results.errors.first() {
        return Err(format!(
            "document {}: {} {}",
            err.id, err.error.code, err.error.message
        ));
    }

    Ok(response
        .results
        .documents
        .into_iter()
        .next()
        .and_then(|doc| {
            doc.entities
                .into_iter()
                .find(|e| e.category == PERSON_CATEGORY)
        })
        .map(|e| e.text))
}

// ---------------------------------------------------------------------------
// LanguageEntityExtractor
// ---------------------------------------------------------------------------

pub struct LanguageEntityExtractor {
    client: Arc<LanguageClient>,
}

impl LanguageEntityExtractor {
    pub fn new(client: Arc<LanguageClient>) -> Self {
        Self { client }
    }

    async fn recognize(&self, text: &str) -> Result<EntityRecognitionResponse, LanguageError> {
        let body = serde_json::json!({
            "kind": "EntityRecognition",
            "parameters": { "modelVersion": "latest" },
            "analysisInput": self.client.analysis_input(text),
        });
        self.client.post_json("language/:analyze-text", &body).await
    }
}

#[async_trait]
impl EntityExtractor for LanguageEntityExtractor {
    async fn find_person(&self, text: &str) -> Option<String> {
        let response = match self.recognize(text).await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Encountered exception. {e}");
                return None;
            }
        };

        match first_person(response) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("Encountered exception. {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> EntityRecognitionResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn picks_first_person_in_service_order() {
        let response = parse(json!({
            "kind": "EntityRecognitionResults",
            "results": {
                "documents": [{
                    "id": "1",
                    "entities": [
                        { "text": "París", "category": "Location", "offset": 0, "length": 5, "confidenceScore": 0.99 },
                        { "text": "Marie", "category": "Person", "offset": 10, "length": 5, "confidenceScore": 0.61 },
                        { "text": "Marie Curie", "category": "Person", "offset": 20, "length": 11, "confidenceScore": 0.99 }
                    ],
                    "warnings": []
                }],
                "errors": [],
                "modelVersion": "2023-09-01"
            }
        }));
        assert_eq!(first_person(response), Ok(Some("Marie".to_string())));
    }

    #[test]
    fn no_person_entities_is_none() {
        let response = parse(json!({
            "results": {
                "documents": [{
                    "id": "1",
                    "entities": [{ "text": "mañana", "category": "DateTime" }]
                }],
                "errors": []
            }
        }));
        assert_eq!(first_person(response), Ok(None));
    }

    #[test]
    fn empty_document_list_is_none() {
        let response = parse(json!({ "results": { "documents": [], "errors": [] } }));
        assert_eq!(first_person(response), Ok(None));
    }

    #[test]
    fn document_error_is_reported() {
        let response = parse(json!({
            "results": {
                "documents": [],
                "errors": [{
                    "id": "1",
                    "error": { "code": "InvalidArgument", "message": "Document text is empty." }
                }]
            }
        }));
        let err = first_person(response).unwrap_err();
        assert!(err.contains("InvalidArgument"));
    }

    #[test]
    fn category_match_is_exact() {
        let response = parse(json!({
            "results": {
                "documents": [{ "entities": [{ "text": "doctor", "category": "PersonType" }] }]
            }
        }));
        assert_eq!(first_person(response), Ok(None));
    }

    #[tokio::test]
    async fn unreachable_service_is_swallowed() {
        let mut config = crate::config::AppConfig::default();
        // Port 9 (discard) on localhost: the connection is refused immediately.
        config.language.endpoint = "http://127.0.0.1:9".into();
        config.language.timeout_secs = 2;
        let extractor = LanguageEntityExtractor::new(Arc::new(LanguageClient::from_config(&config)));
        assert_eq!(extractor.find_person("Marie Curie").await, None);
    }
}
