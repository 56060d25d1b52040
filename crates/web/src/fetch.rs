//! Article fetching over HTTP.

use crate::extract::extract_excerpt;
use crate::types::{ArticleExcerpt, ArticleLocation};
use reqwest::header::CONTENT_TYPE;
use sift_core::{AppError, AppResult};
use std::time::Duration;

const USER_AGENT: &str = concat!("sift/", env!("CARGO_PKG_VERSION"));

/// Trait for page fetchers.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Download one article and extract its excerpt. Every failure for
    /// this location is a `FetchUnavailable`.
    async fn fetch_excerpt(&self, location: &ArticleLocation) -> AppResult<ArticleExcerpt>;
}

/// HTTP fetcher with a per-request timeout.
///
/// TLS certificates are validated against the bundled webpki roots.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create fetch HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

/// Whether a `Content-Type` value can be parsed as a page.
///
/// A missing header is accepted.
pub fn is_textual(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let mime = value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            mime.starts_with("text/") || mime.ends_with("+xml") || mime == "application/xml"
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    #[tracing::instrument(skip(self, location), fields(url = %location))]
    async fn fetch_excerpt(&self, location: &ArticleLocation) -> AppResult<ArticleExcerpt> {
        let response = self
            .client
            .get(location.as_str())
            .send()
            .await
            .map_err(|e| AppError::FetchUnavailable(format!("{}: {}", location, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchUnavailable(format!(
                "{}: HTTP {}",
                location, status
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_textual(content_type.as_deref()) {
            return Err(AppError::FetchUnavailable(format!(
                "{}: unsupported content type {}",
                location,
                content_type.unwrap_or_default()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::FetchUnavailable(format!("{}: {}", location, e)))?;

        tracing::debug!("Fetched {} bytes", body.len());

        extract_excerpt(&body)
            .map_err(|e| AppError::FetchUnavailable(format!("{}: {}", location, e)))
    }
}
