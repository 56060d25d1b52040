//! Retrieval-augmented answering over a session corpus.

use crate::embeddings::EmbeddingProvider;
use crate::history::HistoryStore;
use crate::rag::stages::{self, GenerationSettings};
use crate::rag::types::RagResponse;
use sift_core::{AppConfig, AppResult, Corpus, SessionId};
use sift_llm::LlmClient;
use sift_prompt::PromptSet;
use std::sync::Arc;
use std::time::Duration;

/// Tunables for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub generation: GenerationSettings,
    pub top_k: usize,
}

impl EngineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            generation: GenerationSettings {
                model: config.llm.model.clone(),
                temperature: config.llm.temperature,
                max_tokens: config.llm.max_tokens,
                timeout: Duration::from_secs(config.llm.timeout_secs),
            },
            top_k: config.retrieval.top_k,
        }
    }
}

/// Answers queries against a corpus, keeping per-session chat history.
pub struct AnsweringEngine {
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn EmbeddingProvider>,
    history: Arc<HistoryStore>,
    prompts: PromptSet,
    options: EngineOptions,
}

impl AnsweringEngine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        history: Arc<HistoryStore>,
        prompts: PromptSet,
        options: EngineOptions,
    ) -> Self {
        Self {
            llm,
            embedder,
            history,
            prompts,
            options,
        }
    }

    /// The history store this engine appends to.
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Answer `query` from `corpus`.
    ///
    /// History is only updated after a successful generation; on any
    /// error the session's history is left as it was.
    pub async fn answer(
        &self,
        corpus: &Corpus,
        query: &str,
        session: &SessionId,
    ) -> AppResult<RagResponse> {
        tracing::info!(
            "Answering for session {} over {} documents",
            session,
            corpus.len()
        );

        let index = stages::build_index(self.embedder.as_ref(), corpus).await?;
        let history = self.history.get(session);

        let standalone = stages::reformulate(
            self.llm.as_ref(),
            &self.prompts,
            &self.options.generation,
            &history,
            query,
        )
        .await?;

        let context = stages::retrieve(
            self.embedder.as_ref(),
            &index,
            &standalone,
            self.options.top_k,
        )
        .await?;
        tracing::info!(
            "Retrieved {} documents (max score: {:.3})",
            context.documents.len(),
            context.max_score()
        );

        let answer = stages::generate(
            self.llm.as_ref(),
            &self.prompts,
            &self.options.generation,
            &history,
            &context,
            query,
        )
        .await?;

        self.history.append_exchange(session, query, &answer);

        Ok(RagResponse {
            answer,
            standalone_query: standalone.text,
            documents_used: context.documents.len(),
            max_score: context.max_score(),
        })
    }
}
