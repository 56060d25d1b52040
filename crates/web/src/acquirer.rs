//! Search, then fetch every discovered article with bounded concurrency.

use crate::corpus::build_corpus;
use crate::fetch::PageFetcher;
use crate::search::SearchClient;
use crate::types::{ArticleExcerpt, ArticleLocation};
use futures::stream::{self, StreamExt};
use sift_core::{AppError, AppResult, Corpus};
use std::sync::Arc;

/// Result of fetching one location.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(ArticleExcerpt),
    Failed {
        location: ArticleLocation,
        reason: String,
    },
}

/// Everything one acquisition produced.
#[derive(Debug, Clone, Default)]
pub struct Acquisition {
    /// Locations returned by search, in rank order
    pub discovered: Vec<ArticleLocation>,
    /// Excerpts of successfully fetched articles, in rank order
    pub excerpts: Vec<ArticleExcerpt>,
    /// Locations that could not be fetched, with the reason
    pub failures: Vec<(ArticleLocation, String)>,
}

impl Acquisition {
    pub fn corpus(&self) -> Corpus {
        build_corpus(&self.excerpts)
    }
}

/// Discovers sources for a query and turns them into excerpts.
pub struct ContentAcquirer {
    search: Arc<dyn SearchClient>,
    fetcher: Arc<dyn PageFetcher>,
    concurrency: usize,
}

impl ContentAcquirer {
    pub fn new(
        search: Arc<dyn SearchClient>,
        fetcher: Arc<dyn PageFetcher>,
        concurrency: usize,
    ) -> Self {
        Self {
            search,
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Search for `query` and fetch every result.
    ///
    /// Failed fetches are skipped. The acquisition fails with
    /// `FetchUnavailable` only when search found at least one location and
    /// none of them could be fetched; zero search results yields an empty
    /// acquisition.
    pub async fn acquire(&self, query: &str) -> AppResult<Acquisition> {
        let discovered = self.search.discover_sources(query).await?;
        tracing::info!("Discovered {} sources", discovered.len());

        let outcomes = self.fetch_all(&discovered).await;

        let mut acquisition = Acquisition {
            discovered,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Fetched(excerpt) => acquisition.excerpts.push(excerpt),
                FetchOutcome::Failed { location, reason } => {
                    tracing::warn!("Skipping {}: {}", location, reason);
                    acquisition.failures.push((location, reason));
                }
            }
        }

        if !acquisition.discovered.is_empty() && acquisition.excerpts.is_empty() {
            return Err(AppError::FetchUnavailable(format!(
                "All {} discovered articles failed to fetch",
                acquisition.discovered.len()
            )));
        }

        tracing::info!(
            "Fetched {} of {} articles",
            acquisition.excerpts.len(),
            acquisition.discovered.len()
        );
        Ok(acquisition)
    }

    /// Convenience wrapper returning the joined corpus.
    pub async fn acquire_corpus(&self, query: &str) -> AppResult<Corpus> {
        Ok(self.acquire(query).await?.corpus())
    }

    /// Fetch concurrently; outcomes come back in input order.
    async fn fetch_all(&self, locations: &[ArticleLocation]) -> Vec<FetchOutcome> {
        stream::iter(locations.iter().cloned())
            .map(|location| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    match fetcher.fetch_excerpt(&location).await {
                        Ok(excerpt) => FetchOutcome::Fetched(excerpt),
                        Err(e) => FetchOutcome::Failed {
                            location,
                            reason: e.to_string(),
                        },
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
