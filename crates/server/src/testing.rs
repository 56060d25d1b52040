//! In-memory collaborators for gateway and router tests.

use crate::gateway::Gateway;
use sift_core::{AppError, AppResult};
use sift_knowledge::{
    create_provider, AnsweringEngine, EmbeddingConfig, EngineOptions, GenerationSettings,
    HistoryStore, SessionCache,
};
use sift_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use sift_prompt::PromptSet;
use sift_web::{ArticleExcerpt, ArticleLocation, ContentAcquirer, PageFetcher, SearchClient};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct FakeSearch {
    links: Option<Vec<&'static str>>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl FakeSearch {
    pub fn returning(links: Vec<&'static str>) -> Self {
        Self {
            links: Some(links),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            links: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay_ms(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }
}

#[async_trait::async_trait]
impl SearchClient for FakeSearch {
    async fn discover_sources(&self, _query: &str) -> AppResult<Vec<ArticleLocation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.links {
            Some(links) => Ok(links.iter().map(|l| ArticleLocation::new(*l)).collect()),
            None => Err(AppError::SearchUnavailable("HTTP 403".to_string())),
        }
    }
}

pub struct FakeFetcher {
    pages: HashMap<&'static str, ArticleExcerpt>,
}

impl FakeFetcher {
    pub fn new(pages: Vec<(&'static str, ArticleExcerpt)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_excerpt(&self, location: &ArticleLocation) -> AppResult<ArticleExcerpt> {
        self.pages
            .get(location.as_str())
            .cloned()
            .ok_or_else(|| AppError::FetchUnavailable(format!("{}: HTTP 404", location)))
    }
}

pub fn page(headings: &[&str], paragraphs: &[&str]) -> ArticleExcerpt {
    ArticleExcerpt::new(
        headings.iter().map(|s| s.to_string()).collect(),
        paragraphs.iter().map(|s| s.to_string()).collect(),
    )
}

type Reply = Box<dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync>;

/// Model fake that records requests.
pub struct ScriptedLlm {
    reply: Reply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    fn new(reply: impl Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers with the system message, i.e. the instruction plus context.
    pub fn echo_system() -> Self {
        Self::new(|req| Ok(req.system().unwrap_or_default().to_string()))
    }

    pub fn fixed(text: &'static str) -> Self {
        Self::new(move |_| Ok(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(AppError::GenerationUnavailable("HTTP 429".to_string())))
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let content = (self.reply)(request)?;
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// Gateway over the given fakes, the mock embedder and built-in prompts.
pub fn gateway_with(
    search: Arc<FakeSearch>,
    fetcher: Arc<FakeFetcher>,
    llm: Arc<ScriptedLlm>,
) -> Gateway {
    let acquirer = ContentAcquirer::new(search, fetcher, 2);
    let embedder = create_provider(&EmbeddingConfig::default(), None).unwrap();
    let options = EngineOptions {
        generation: GenerationSettings {
            model: "test-model".to_string(),
            temperature: 0.3,
            max_tokens: 256,
            timeout: Duration::from_secs(5),
        },
        top_k: 4,
    };
    let engine = AnsweringEngine::new(
        llm,
        embedder,
        Arc::new(HistoryStore::new()),
        PromptSet::builtin().unwrap(),
        options,
    );

    Gateway::new(acquirer, engine, Arc::new(SessionCache::new()))
}
