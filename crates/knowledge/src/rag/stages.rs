//! The answering pipeline as explicit stages:
//! index build, reformulate, retrieve, generate.

use crate::embeddings::EmbeddingProvider;
use crate::rag::types::{RetrievedContext, StandaloneQuery};
use crate::vector_index::{MemoryIndex, VectorIndex};
use sift_core::{AppError, AppResult, Corpus};
use sift_llm::{ChatMessage, LlmClient, LlmRequest};
use sift_prompt::PromptSet;
use std::future::Future;
use std::time::Duration;

/// Sampling settings shared by both model calls.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Deadline applied to each model call
    pub timeout: Duration,
}

/// Embed every corpus entry and build a fresh flat index.
pub async fn build_index(
    embedder: &dyn EmbeddingProvider,
    corpus: &Corpus,
) -> AppResult<MemoryIndex> {
    let texts: Vec<String> = corpus
        .entries()
        .iter()
        .map(|e| e.text().to_string())
        .collect();

    let embeddings = if texts.is_empty() {
        Vec::new()
    } else {
        embedder.embed_batch(&texts).await.map_err(as_generation_error)?
    };

    tracing::debug!(
        "Indexed {} documents ({} bytes) with {}/{}",
        texts.len(),
        corpus.byte_len(),
        embedder.provider_name(),
        embedder.model_name()
    );

    MemoryIndex::from_embeddings(embedder.dimensions(), &texts, embeddings)
}

/// Rewrite a follow-up question into a self-contained one.
///
/// With no history there is nothing to resolve, so the query passes
/// through without a model call. A blank model reply also falls back to
/// the raw query.
pub async fn reformulate(
    llm: &dyn LlmClient,
    prompts: &PromptSet,
    settings: &GenerationSettings,
    history: &[ChatMessage],
    query: &str,
) -> AppResult<StandaloneQuery> {
    if history.is_empty() {
        return Ok(StandaloneQuery::passthrough(query));
    }

    let messages = conversation(prompts.contextualize_instruction()?, history, query);
    let reply = complete(llm, settings, messages).await?;
    let rewritten = reply.trim();

    if rewritten.is_empty() {
        tracing::warn!("Reformulation returned blank text, using the raw query");
        return Ok(StandaloneQuery::passthrough(query));
    }

    tracing::info!("Reformulated query: {}", rewritten);
    Ok(StandaloneQuery {
        text: rewritten.to_string(),
        rewritten: true,
    })
}

/// Nearest-neighbour search for the standalone query.
pub async fn retrieve(
    embedder: &dyn EmbeddingProvider,
    index: &MemoryIndex,
    query: &StandaloneQuery,
    top_k: usize,
) -> AppResult<RetrievedContext> {
    if index.is_empty() {
        return Ok(RetrievedContext::default());
    }

    let query_embedding = embedder
        .embed(&query.text)
        .await
        .map_err(as_generation_error)?;
    let documents = index.search(&query_embedding, top_k)?;

    Ok(RetrievedContext { documents })
}

/// Produce the final answer from the retrieved context.
pub async fn generate(
    llm: &dyn LlmClient,
    prompts: &PromptSet,
    settings: &GenerationSettings,
    history: &[ChatMessage],
    context: &RetrievedContext,
    query: &str,
) -> AppResult<String> {
    let system = prompts.answer_instruction(&context.joined())?;
    let reply = complete(llm, settings, conversation(system, history, query)).await?;
    Ok(reply.trim().to_string())
}

/// `[system, history..., user]`
fn conversation(system: String, history: &[ChatMessage], query: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(query));
    messages
}

async fn complete(
    llm: &dyn LlmClient,
    settings: &GenerationSettings,
    messages: Vec<ChatMessage>,
) -> AppResult<String> {
    let request = LlmRequest::new(messages, settings.model.clone())
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens);

    let response = with_deadline(settings.timeout, llm.complete(&request)).await?;
    tracing::debug!(
        "Model {} used {} tokens",
        response.model,
        response.usage.total_tokens
    );
    Ok(response.content)
}

/// Run a model call under a deadline.
pub async fn with_deadline<T, F>(timeout: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(as_generation_error),
        Err(_) => Err(AppError::GenerationUnavailable(format!(
            "Model call exceeded the {:?} deadline",
            timeout
        ))),
    }
}

/// Provider failures of any kind surface as `GenerationUnavailable`.
fn as_generation_error(err: AppError) -> AppError {
    match err {
        AppError::GenerationUnavailable(_) => err,
        other => AppError::GenerationUnavailable(other.to_string()),
    }
}
