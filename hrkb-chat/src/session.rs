//! Session-scoped conversation history.
//!
//! Each session holds an ordered, append-only list of question/answer
//! turns, bounded to a configurable number of most-recent turns so prompt
//! size stays bounded. Sessions are isolated: nothing leaks across session
//! ids, and nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

/// One completed question/answer exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// The user's question.
    pub question: String,
    /// The generated answer.
    pub answer: String,
}

/// Ordered history of one session, bounded to the most recent turns.
#[derive(Debug)]
pub struct SessionHistory {
    turns: Vec<Turn>,
    max_turns: usize,
}

impl SessionHistory {
    fn new(max_turns: usize) -> Self {
        Self { turns: Vec::new(), max_turns }
    }

    /// The turns in chronological order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of retained turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the session has no retained turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a completed turn, evicting the oldest when at capacity.
    pub fn push(&mut self, turn: Turn) {
        if self.max_turns > 0 && self.turns.len() == self.max_turns {
            self.turns.remove(0);
        }
        self.turns.push(turn);
    }
}

/// Session-keyed store of conversation histories.
///
/// Each history sits behind its own async mutex; the engine holds that
/// mutex for the duration of a question, which both serializes a session's
/// turns and lets a second concurrent question be rejected.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionHistory>>>>,
    max_turns: usize,
}

impl SessionStore {
    /// Create a store whose sessions retain at most `max_turns` turns.
    pub fn new(max_turns: usize) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), max_turns }
    }

    /// Get or create the history handle for a session.
    pub async fn session(&self, session_id: &str) -> Arc<Mutex<SessionHistory>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(history) = sessions.get(session_id) {
                return history.clone();
            }
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionHistory::new(self.max_turns))))
            .clone()
    }

    /// Number of retained turns for a session (zero if it does not exist).
    pub async fn turn_count(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().await;
        match sessions.get(session_id) {
            Some(history) => history.lock().await.len(),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_is_append_only_and_ordered() {
        let store = SessionStore::new(10);
        let session = store.session("s1").await;
        {
            let mut history = session.lock().await;
            history.push(Turn { question: "q1".into(), answer: "a1".into() });
            history.push(Turn { question: "q2".into(), answer: "a2".into() });
        }
        let history = session.lock().await;
        assert_eq!(history.turns()[0].question, "q1");
        assert_eq!(history.turns()[1].question, "q2");
    }

    #[tokio::test]
    async fn oldest_turn_is_evicted_at_capacity() {
        let store = SessionStore::new(2);
        let session = store.session("s1").await;
        let mut history = session.lock().await;
        for i in 0..3 {
            history.push(Turn { question: format!("q{i}"), answer: format!("a{i}") });
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].question, "q1");
        assert_eq!(history.turns()[1].question, "q2");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new(10);
        let a = store.session("a").await;
        a.lock().await.push(Turn { question: "q".into(), answer: "a".into() });

        assert_eq!(store.turn_count("a").await, 1);
        assert_eq!(store.turn_count("b").await, 0);
    }
}
