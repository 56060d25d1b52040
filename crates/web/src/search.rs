//! Source discovery through a web search API.

use crate::types::ArticleLocation;
use serde::{Deserialize, Serialize};
use sift_core::{AppError, AppResult};
use std::time::Duration;

pub use sift_core::config::DEFAULT_SERPER_ENDPOINT;

const SEARCH_TIMEOUT_SECS: u64 = 15;

/// Trait for search backends.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Ranked article locations for `query`. An empty result is not an
    /// error.
    async fn discover_sources(&self, query: &str) -> AppResult<Vec<ArticleLocation>>;
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    link: String,
}

/// Serper (Google search) client.
pub struct SerperClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_sources: usize,
}

impl SerperClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        max_sources: usize,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create search HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            max_sources,
        })
    }

    fn parse_response(&self, body: &str) -> AppResult<Vec<ArticleLocation>> {
        let parsed: SerperResponse = serde_json::from_str(body).map_err(|e| {
            AppError::SearchUnavailable(format!("Malformed search response: {}", e))
        })?;

        Ok(parsed
            .organic
            .into_iter()
            .take(self.max_sources)
            .map(|r| ArticleLocation::new(r.link))
            .collect())
    }
}

#[async_trait::async_trait]
impl SearchClient for SerperClient {
    #[tracing::instrument(skip(self), fields(max_sources = self.max_sources))]
    async fn discover_sources(&self, query: &str) -> AppResult<Vec<ArticleLocation>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest { q: query })
            .send()
            .await
            .map_err(|e| AppError::SearchUnavailable(format!("Search request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::SearchUnavailable(format!("Failed to read search response: {}", e))
        })?;

        if !status.is_success() {
            return Err(AppError::SearchUnavailable(format!(
                "Search API error ({}): {}",
                status, body
            )));
        }

        let locations = self.parse_response(&body)?;
        tracing::info!("Search returned {} sources", locations.len());
        Ok(locations)
    }
}
