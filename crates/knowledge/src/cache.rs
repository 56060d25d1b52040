//! Per-session corpus cache.

use sift_core::{Corpus, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Single-slot corpus cache keyed by session.
///
/// Each call is atomic, but a `get` miss followed by `put` is not: two
/// concurrent requests for the same session may both acquire, and the
/// last `put` wins.
#[derive(Debug, Default)]
pub struct SessionCache {
    slots: RwLock<HashMap<SessionId, Arc<Corpus>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached corpus for the session, if any.
    pub fn get(&self, session: &SessionId) -> Option<Arc<Corpus>> {
        self.slots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session)
            .cloned()
    }

    /// Replace the session's slot unconditionally.
    pub fn put(&self, session: &SessionId, corpus: Corpus) -> Arc<Corpus> {
        let corpus = Arc::new(corpus);
        self.slots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(session.clone(), Arc::clone(&corpus));
        corpus
    }

    /// Empty the session's slot. Clearing an empty slot is a no-op.
    pub fn clear(&self, session: &SessionId) {
        let removed = self
            .slots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session);
        tracing::debug!(
            "Cleared corpus cache for session {} (was_cached={})",
            session,
            removed.is_some()
        );
    }

    /// Empty every slot.
    pub fn clear_all(&self) {
        self.slots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Number of sessions with a cached corpus.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::CorpusEntry;

    fn corpus(text: &str) -> Corpus {
        Corpus::new(vec![CorpusEntry::new(text)])
    }

    #[test]
    fn test_get_put_clear() {
        let cache = SessionCache::new();
        let session = SessionId::default();

        assert!(cache.get(&session).is_none());

        cache.put(&session, corpus("one"));
        assert_eq!(cache.get(&session).unwrap().entries()[0].text(), "one");

        cache.put(&session, corpus("two"));
        assert_eq!(cache.get(&session).unwrap().entries()[0].text(), "two");
        assert_eq!(cache.len(), 1);

        cache.clear(&session);
        assert!(cache.get(&session).is_none());
        // Idempotent
        cache.clear(&session);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let cache = SessionCache::new();
        let a = SessionId::new("a");
        let b = SessionId::new("b");

        cache.put(&a, corpus("for a"));
        cache.put(&b, corpus("for b"));
        cache.clear(&a);

        assert!(cache.get(&a).is_none());
        assert_eq!(cache.get(&b).unwrap().entries()[0].text(), "for b");

        cache.clear_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_empty_corpus_is_still_cached() {
        let cache = SessionCache::new();
        let session = SessionId::default();
        cache.put(&session, Corpus::default());
        assert!(cache.get(&session).unwrap().is_empty());
    }
}
