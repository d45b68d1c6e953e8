//! Chat sessions — history routing by session id, with bounded growth.

use crate::token::estimate_messages_tokens;
use async_trait::async_trait;
use scour_core::message::{Conversation, Message, Role};
use scour_core::provider::{Provider, ProviderRequest};
use scour_core::session::{SessionId, SessionStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory session store. Sessions are created on first use and live
/// until removed; there is no automatic eviction.
pub struct InMemorySessions {
    sessions: RwLock<HashMap<SessionId, Conversation>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn get_or_create(&self, id: &SessionId) -> Conversation {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.clone())
            .or_insert_with(Conversation::new)
            .clone()
    }

    async fn get(&self, id: &SessionId) -> Option<Conversation> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn update(&self, id: &SessionId, conversation: Conversation) {
        self.sessions.write().await.insert(id.clone(), conversation);
    }

    async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// A chat runner: per-session history + system prompt in front of every
/// provider call, history trimmed from the front when it outgrows the
/// token budget.
pub struct ChatAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: String,
    sessions: Arc<dyn SessionStore>,
    history_token_budget: usize,
}

impl ChatAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            system_prompt: system_prompt.into(),
            sessions,
            history_token_budget: 2048,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_history_budget(mut self, tokens: usize) -> Self {
        self.history_token_budget = tokens;
        self
    }

    /// One chat turn: append the user input to the session history, call
    /// the provider, store the reply, return its text.
    pub async fn send(
        &self,
        session_id: &SessionId,
        input: &str,
    ) -> Result<String, scour_core::Error> {
        let mut conversation = self.sessions.get_or_create(session_id).await;
        conversation.push(Message::user(input));

        let history = trim_history(&conversation.messages, self.history_token_budget);
        let mut messages = vec![Message::system(&self.system_prompt)];
        messages.extend(history.iter().cloned());

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: vec![],
        };

        let response = self.provider.complete(request).await?;

        let reply = response.message.content.clone();
        conversation.push(response.message);
        self.sessions.update(session_id, conversation).await;

        debug!(session = %session_id, "Chat turn complete");
        Ok(reply)
    }
}

/// Drop messages from the front until the estimate fits the budget, always
/// keeping at least the final message (the current user input).
fn trim_history(messages: &[Message], token_budget: usize) -> Vec<Message> {
    let mut start = 0;
    while start + 1 < messages.len()
        && estimate_messages_tokens(&messages[start..]) > token_budget
    {
        start += 1;
    }
    // Never lead with an orphaned tool/assistant pairing break: advance to
    // the next user message if trimming cut mid-exchange.
    while start < messages.len().saturating_sub(1) && messages[start].role != Role::User {
        start += 1;
    }
    messages[start..].to_vec()
}
