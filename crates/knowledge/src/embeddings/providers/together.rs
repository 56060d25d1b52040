//! Together AI embedding provider (OpenAI-compatible `/v1/embeddings`).

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sift_core::{AppError, AppResult};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_TOGETHER_URL: &str = "https://api.together.xyz";

/// Together embedding provider.
#[derive(Clone)]
pub struct TogetherProvider {
    client: Client,
    base_url: String,
    api_key: String,
    config: EmbeddingConfig,
}

impl std::fmt::Debug for TogetherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TogetherProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl TogetherProvider {
    pub fn new(config: EmbeddingConfig, api_key: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for Together: {}", e))
            })?;

        let base_url = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_TOGETHER_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            config,
        })
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len()))]
    async fn embed_chunk(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::GenerationUnavailable(format!(
                    "Failed to send embedding request to Together: {}",
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::GenerationUnavailable(format!(
                "Together embedding API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::GenerationUnavailable(format!(
                "Failed to parse Together embedding response: {}",
                e
            ))
        })?;

        self.order_vectors(body, texts.len())
    }

    /// Restore input order and check the response shape.
    fn order_vectors(&self, body: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
        if body.data.len() != expected {
            return Err(AppError::GenerationUnavailable(format!(
                "Together returned {} embeddings for {} inputs",
                body.data.len(),
                expected
            )));
        }

        let mut data = body.data;
        data.sort_by_key(|d| d.index);

        data.into_iter()
            .map(|d| {
                self.config.check_dimensions(&d.embedding)?;
                Ok(d.embedding)
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for TogetherProvider {
    fn provider_name(&self) -> &str {
        "together"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Blank texts get a zero vector and are never sent; the rest are
    /// embedded in chunks and merged back in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = vec![vec![0.0; self.config.dimensions]; texts.len()];

        let (positions, pending): (Vec<usize>, Vec<String>) = texts
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| (i, text.clone()))
            .unzip();

        if pending.len() < texts.len() {
            warn!(
                "Using zero vectors for {} blank texts",
                texts.len() - pending.len()
            );
        }

        let mut vectors = Vec::with_capacity(pending.len());
        for chunk in pending.chunks(self.config.batch_size.max(1)) {
            vectors.extend(self.embed_chunk(chunk).await?);
        }
        for (position, vector) in positions.into_iter().zip(vectors) {
            embeddings[position] = vector;
        }

        debug!(
            "Embedded {} texts with Together model {}",
            embeddings.len(),
            self.config.model
        );
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(dimensions: usize) -> TogetherProvider {
        let config = EmbeddingConfig {
            provider: "together".to_string(),
            model: "BAAI/bge-base-en-v1.5".to_string(),
            dimensions,
            ..Default::default()
        };
        TogetherProvider::new(config, "secret").unwrap()
    }

    #[test]
    fn test_vectors_reordered_by_index() {
        let body: EmbeddingResponse = serde_json::from_str(
            r#"{"object": "list", "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ]}"#,
        )
        .unwrap();

        let vectors = provider(2).order_vectors(body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"index": 0, "embedding": [1.0, 0.0]}]}"#).unwrap();
        let err = provider(2).order_vectors(body, 3).unwrap_err();
        assert!(matches!(err, AppError::GenerationUnavailable(_)));
    }

    #[test]
    fn test_wrong_dimensions_is_error() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#).unwrap();
        assert!(provider(2).order_vectors(body, 1).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", provider(768));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("bge-base"));
    }

    #[tokio::test]
    async fn test_blank_texts_skip_the_network() {
        let config = EmbeddingConfig {
            provider: "together".to_string(),
            model: "BAAI/bge-base-en-v1.5".to_string(),
            dimensions: 4,
            endpoint: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        };
        let provider = TogetherProvider::new(config, "secret").unwrap();

        let embeddings = provider
            .embed_batch(&["".to_string(), " ".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings, vec![vec![0.0; 4], vec![0.0; 4]]);
    }

    #[tokio::test]
    async fn test_non_blank_text_still_calls_the_api() {
        let config = EmbeddingConfig {
            provider: "together".to_string(),
            dimensions: 4,
            endpoint: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: 2,
            ..Default::default()
        };
        let provider = TogetherProvider::new(config, "secret").unwrap();

        let err = provider
            .embed_batch(&[" ".to_string(), "Paris".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::GenerationUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let embeddings = provider(768).embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }
}
