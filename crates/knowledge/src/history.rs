//! Per-session conversation history.

use sift_core::SessionId;
use sift_llm::ChatMessage;
use std::collections::HashMap;
use std::sync::RwLock;

/// Append-only chat history keyed by session.
#[derive(Debug, Default)]
pub struct HistoryStore {
    sessions: RwLock<HashMap<SessionId, Vec<ChatMessage>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session's turns, oldest first. Empty when unknown.
    pub fn get(&self, session: &SessionId) -> Vec<ChatMessage> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    /// Record one question/answer exchange as a user turn followed by an
    /// assistant turn.
    pub fn append_exchange(&self, session: &SessionId, query: &str, answer: &str) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let turns = sessions.entry(session.clone()).or_default();
        turns.push(ChatMessage::user(query));
        turns.push(ChatMessage::assistant(answer));
    }

    /// Drop the session's history.
    pub fn clear(&self, session: &SessionId) {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session);
    }

    pub fn clear_all(&self) {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Number of turns recorded for the session.
    pub fn turn_count(&self, session: &SessionId) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session)
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_llm::Role;

    #[test]
    fn test_append_and_get() {
        let store = HistoryStore::new();
        let session = SessionId::default();
        assert!(store.get(&session).is_empty());

        store.append_exchange(&session, "capital of France?", "Paris.");
        store.append_exchange(&session, "population?", "About two million.");

        let turns = store.get(&session);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "capital of France?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[3].content, "About two million.");
        assert_eq!(store.turn_count(&session), 4);
    }

    #[test]
    fn test_clear_only_affects_one_session() {
        let store = HistoryStore::new();
        let a = SessionId::new("a");
        let b = SessionId::new("b");
        store.append_exchange(&a, "q", "a");
        store.append_exchange(&b, "q", "a");

        store.clear(&a);
        assert_eq!(store.turn_count(&a), 0);
        assert_eq!(store.turn_count(&b), 2);

        store.clear_all();
        assert_eq!(store.turn_count(&b), 0);
    }
}
