//! [`KnowledgeLookup`] trait and the Knowledge Graph search implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::http::{client_with_timeout, ensure_success, HttpError};

#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    /// Detailed description of `name`, or `None` if nothing was found.
    ///
    /// Transport and parse failures are reported as `None`.
    async fn describe(&self, name: &str) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub item_list_element: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchItem {
    #[serde(default)]
    pub result: SearchResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResult {
    #[serde(default)]
    pub detailed_description: Option<DetailedDescription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DetailedDescription {
    #[serde(default)]
    pub article_body: Option<String>,
}

/// `itemListElement[0].result.detailedDescription.articleBody`, trimmed.
/// A blank body counts as absent.
pub(crate) fn parse_description(response: SearchResponse) -> Option<String> {
    response
        .item_list_element
        .into_iter()
        .next()?
        .result
        .detailed_description?
        .article_body
        .map(|body| body.trim().to_string())
        .filter(|body| !body.is_empty())
}

// ---------------------------------------------------------------------------
// KnowledgeGraphLookup
// ---------------------------------------------------------------------------

pub struct KnowledgeGraphLookup {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    languages: String,
}

impl KnowledgeGraphLookup {
    pub fn from_config(config: &AppConfig) -> Self {
        let kg = &config.knowledge;
        Self {
            client: client_with_timeout(kg.timeout_secs),
            endpoint: kg.endpoint.clone(),
            key: kg.key.clone().unwrap_or_default(),
            languages: kg.languages.clone(),
        }
    }

    fn query<'a>(&'a self, name: &'a str) -> [(&'static str, &'a str); 5] {
        [
            ("query", name),
            ("limit", "1"),
            ("indent", "true"),
            ("key", self.key.as_str()),
            ("languages", self.languages.as_str()),
        ]
    }

    async fn search(&self, name: &str) -> Result<SearchResponse, HttpError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(name))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json::<SearchResponse>().await?)
    }
}

#[async_trait]
impl KnowledgeLookup for KnowledgeGraphLookup {
    async fn describe(&self, name: &str) -> Option<String> {
        match self.search(name).await {
            Ok(response) => {
                let description = parse_description(response);
                if description.is_none() {
                    log::debug!("knowledge: no description for {name}");
                }
                description
            }
            Err(e) => {
                log::warn!("knowledge lookup for {name} failed: {e}");
                None
            }
        }
    }
}
