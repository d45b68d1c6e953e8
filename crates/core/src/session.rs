//! Session store — conversation history keyed by session id.
//!
//! Chat surfaces route each inbound message to a conversation by session id.
//! The store has explicit get-or-create semantics: a session is created on
//! first use and lives until removed. There is no automatic eviction or
//! expiry; callers that need it evict via `remove`.

use crate::message::Conversation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The session store trait.
///
/// Conversations are read and written as whole values: a caller takes a
/// snapshot, appends its turn, and writes the result back. Single-flight
/// usage (one turn at a time per session) makes this race-free in practice.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get the conversation for this session, creating an empty one on
    /// first use.
    async fn get_or_create(&self, id: &SessionId) -> Conversation;

    /// Get the conversation for this session, if it exists.
    async fn get(&self, id: &SessionId) -> Option<Conversation>;

    /// Replace the stored conversation for this session.
    async fn update(&self, id: &SessionId, conversation: Conversation);

    /// Remove a session. Returns whether it existed.
    async fn remove(&self, id: &SessionId) -> bool;

    /// Number of live sessions.
    async fn len(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_display() {
        let id = SessionId::new("demo-user-1");
        assert_eq!(id.to_string(), "demo-user-1");
    }

    #[test]
    fn session_id_from_str() {
        let id: SessionId = "abc".into();
        assert_eq!(id, SessionId::new("abc"));
    }
}
