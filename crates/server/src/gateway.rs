//! Request gateway: reset protocol, corpus caching and answering.

use sift_core::{AppResult, SessionId, DEFAULT_SESSION};
use sift_knowledge::{AnsweringEngine, HistoryStore, SessionCache};
use sift_web::ContentAcquirer;
use std::sync::Arc;

/// Acknowledgement returned for reset requests.
pub const RESET_ACK: &str = "Session reset successful.";

/// Ties the acquirer, the session cache and the answering engine together.
pub struct Gateway {
    acquirer: ContentAcquirer,
    engine: AnsweringEngine,
    cache: Arc<SessionCache>,
}

impl Gateway {
    pub fn new(acquirer: ContentAcquirer, engine: AnsweringEngine, cache: Arc<SessionCache>) -> Self {
        Self {
            acquirer,
            engine,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        self.engine.history()
    }

    /// Handle one query for `session`.
    ///
    /// With `reset` the session's corpus and history are dropped and the
    /// query text is ignored. Resetting the default session drops every
    /// session's corpus and history. Otherwise the corpus is acquired on a cache
    /// miss and the engine answers from it. A failed acquisition leaves the
    /// cache slot empty.
    #[tracing::instrument(skip(self, query, session), fields(session = %session))]
    pub async fn handle_query(&self, query: &str, reset: bool, session: &SessionId) -> AppResult<String> {
        if reset {
            if session.as_str() == DEFAULT_SESSION {
                self.cache.clear_all();
                self.history().clear_all();
                tracing::info!("Reset all sessions");
            } else {
                self.cache.clear(session);
                self.history().clear(session);
                tracing::info!("Session reset");
            }
            return Ok(RESET_ACK.to_string());
        }

        let corpus = match self.cache.get(session) {
            Some(corpus) => {
                tracing::info!("Corpus cache hit ({} entries)", corpus.len());
                corpus
            }
            None => {
                tracing::info!("Corpus cache miss, acquiring sources");
                let corpus = self.acquirer.acquire_corpus(query).await?;
                tracing::debug!("Acquired corpus of {} bytes", corpus.byte_len());
                self.cache.put(session, corpus)
            }
        };

        let response = self.engine.answer(&corpus, query, session).await?;
        tracing::debug!(
            "Answered '{}' from {} documents (max score: {:.3})",
            response.standalone_query,
            response.documents_used,
            response.max_score
        );
        Ok(response.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway_with, page, FakeFetcher, FakeSearch, ScriptedLlm};
    use sift_core::AppError;
    use std::sync::atomic::Ordering;

    fn session() -> SessionId {
        SessionId::default()
    }

    #[tokio::test]
    async fn test_end_to_end_answer_mentions_fetched_text() {
        let search = Arc::new(FakeSearch::returning(vec!["https://fr.example"]));
        let fetcher = Arc::new(FakeFetcher::new(vec![(
            "https://fr.example",
            page(&["France"], &["Paris is the capital of France"]),
        )]));
        let gateway = gateway_with(search, fetcher, Arc::new(ScriptedLlm::echo_system()));

        let answer = gateway
            .handle_query("capital of France", false, &session())
            .await
            .unwrap();

        assert!(answer.contains("Paris"));
        assert_eq!(gateway.history().turn_count(&session()), 2);
    }

    #[tokio::test]
    async fn test_second_query_uses_cached_corpus() {
        let search = Arc::new(FakeSearch::returning(vec!["https://a.example"]));
        let fetcher = Arc::new(FakeFetcher::new(vec![(
            "https://a.example",
            page(&[], &["Some article text"]),
        )]));
        let gateway = gateway_with(search.clone(), fetcher, Arc::new(ScriptedLlm::fixed("ok")));

        gateway.handle_query("first", false, &session()).await.unwrap();
        gateway.handle_query("second", false, &session()).await.unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.history().turn_count(&session()), 4);
    }

    #[tokio::test]
    async fn test_reset_clears_state_and_reacquires() {
        let search = Arc::new(FakeSearch::returning(vec!["https://a.example"]));
        let fetcher = Arc::new(FakeFetcher::new(vec![(
            "https://a.example",
            page(&[], &["Some article text"]),
        )]));
        let llm = Arc::new(ScriptedLlm::fixed("ok"));
        let gateway = gateway_with(search.clone(), fetcher, llm.clone());

        gateway.handle_query("first", false, &session()).await.unwrap();
        let ack = gateway.handle_query("ignored", true, &session()).await.unwrap();

        assert_eq!(ack, RESET_ACK);
        assert!(gateway.cache().get(&session()).is_none());
        assert_eq!(gateway.history().turn_count(&session()), 0);

        let before = llm.requests().len();
        gateway.handle_query("third", false, &session()).await.unwrap();
        assert_eq!(search.calls.load(Ordering::SeqCst), 2);

        // Empty history after reset: only the answer call is made.
        assert_eq!(llm.requests().len() - before, 1);
    }

    #[tokio::test]
    async fn test_reset_ignores_query_and_touches_no_collaborator() {
        let search = Arc::new(FakeSearch::returning(vec![]));
        let llm = Arc::new(ScriptedLlm::fixed("unused"));
        let gateway = gateway_with(search.clone(), Arc::new(FakeFetcher::new(vec![])), llm.clone());

        let ack = gateway.handle_query("", true, &session()).await.unwrap();

        assert_eq!(ack, RESET_ACK);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_have_separate_slots() {
        let search = Arc::new(FakeSearch::returning(vec!["https://a.example"]));
        let fetcher = Arc::new(FakeFetcher::new(vec![(
            "https://a.example",
            page(&[], &["text"]),
        )]));
        let gateway = gateway_with(search.clone(), fetcher, Arc::new(ScriptedLlm::fixed("ok")));

        let alice = SessionId::new("alice");
        let bob = SessionId::new("bob");
        gateway.handle_query("q", false, &alice).await.unwrap();
        gateway.handle_query("q", false, &bob).await.unwrap();
        gateway.handle_query("q", true, &alice).await.unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
        assert!(gateway.cache().get(&alice).is_none());
        assert!(gateway.cache().get(&bob).is_some());
        assert_eq!(gateway.history().turn_count(&bob), 2);
    }

    #[tokio::test]
    async fn test_default_session_reset_clears_every_session() {
        let search = Arc::new(FakeSearch::returning(vec!["https://a.example"]));
        let fetcher = Arc::new(FakeFetcher::new(vec![(
            "https://a.example",
            page(&[], &["text"]),
        )]));
        let gateway = gateway_with(search.clone(), fetcher, Arc::new(ScriptedLlm::fixed("ok")));

        let named = SessionId::new("named");
        gateway.handle_query("q", false, &named).await.unwrap();
        gateway.handle_query("q", false, &session()).await.unwrap();

        let ack = gateway.handle_query("", true, &session()).await.unwrap();

        assert_eq!(ack, RESET_ACK);
        assert!(gateway.cache().is_empty());
        assert_eq!(gateway.history().turn_count(&named), 0);
        assert_eq!(gateway.history().turn_count(&session()), 0);
    }

    #[tokio::test]
    async fn test_empty_search_still_answers() {
        let gateway = gateway_with(
            Arc::new(FakeSearch::returning(vec![])),
            Arc::new(FakeFetcher::new(vec![])),
            Arc::new(ScriptedLlm::fixed("I don't know.")),
        );

        let answer = gateway.handle_query("obscure", false, &session()).await.unwrap();

        assert_eq!(answer, "I don't know.");
        let cached = gateway.cache().get(&session()).unwrap();
        assert!(cached.is_empty());
    }

    #[tokio::test]
    async fn test_failed_acquisition_caches_nothing() {
        let gateway = gateway_with(
            Arc::new(FakeSearch::failing()),
            Arc::new(FakeFetcher::new(vec![])),
            Arc::new(ScriptedLlm::fixed("unused")),
        );

        let err = gateway.handle_query("q", false, &session()).await.unwrap_err();

        assert!(matches!(err, AppError::SearchUnavailable(_)));
        assert!(gateway.cache().is_empty());
        assert_eq!(gateway.history().turn_count(&session()), 0);
    }

    #[tokio::test]
    async fn test_all_fetches_failing_is_fetch_error() {
        let gateway = gateway_with(
            Arc::new(FakeSearch::returning(vec!["https://down.example"])),
            Arc::new(FakeFetcher::new(vec![])),
            Arc::new(ScriptedLlm::fixed("unused")),
        );

        let err = gateway.handle_query("q", false, &session()).await.unwrap_err();

        assert!(matches!(err, AppError::FetchUnavailable(_)));
        assert!(gateway.cache().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_corpus_but_not_history() {
        let gateway = gateway_with(
            Arc::new(FakeSearch::returning(vec!["https://a.example"])),
            Arc::new(FakeFetcher::new(vec![("https://a.example", page(&[], &["text"]))])),
            Arc::new(ScriptedLlm::failing()),
        );

        let err = gateway.handle_query("q", false, &session()).await.unwrap_err();

        assert!(matches!(err, AppError::GenerationUnavailable(_)));
        assert!(gateway.cache().get(&session()).is_some());
        assert_eq!(gateway.history().turn_count(&session()), 0);
    }

    /// Two concurrent first queries on one session both miss the cache,
    /// both acquire, and the later write wins. Both exchanges land in
    /// history. Nothing serializes requests within a session.
    #[tokio::test]
    async fn test_concurrent_same_session_requests_race() {
        let search = Arc::new(FakeSearch::returning(vec!["https://a.example"]).with_delay_ms(20));
        let fetcher = Arc::new(FakeFetcher::new(vec![("https://a.example", page(&[], &["text"]))]));
        let gateway = gateway_with(search.clone(), fetcher, Arc::new(ScriptedLlm::fixed("ok")));

        let sid = session();
        let (first, second) = tokio::join!(
            gateway.handle_query("one", false, &sid),
            gateway.handle_query("two", false, &sid),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
        assert_eq!(gateway.cache().len(), 1);
        assert_eq!(gateway.history().turn_count(&session()), 4);
    }
}
