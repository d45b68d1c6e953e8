//! Research state — the value threaded through the control loop.

use scour_core::message::Message;
use scour_core::tool::{CorpusHit, WebHit};

/// The full state of one research run.
///
/// Transitions are reducers: each consumes the previous state and returns
/// the next one. Invariants: `step_count` only increases; `satisfied`, once
/// set, stays set for the rest of the run; `confidence` never decreases.
/// A fresh state is built per top-level query.
#[derive(Debug, Clone)]
pub struct ResearchState {
    /// Conversation transcript (system prompt first)
    pub messages: Vec<Message>,

    /// Agent steps taken so far
    pub step_count: u32,

    /// Tool invocations processed so far
    pub tool_call_count: u32,

    /// Whether the agent has produced an answer without further tool requests
    pub satisfied: bool,

    /// Findings from the internal corpus
    pub corp_findings: Vec<CorpusHit>,

    /// Findings from the web / issue tracker
    pub web_findings: Vec<WebHit>,

    /// Best corpus similarity observed so far
    pub confidence: f32,

    /// The original query
    pub query: String,
}

impl ResearchState {
    /// Initial state: system prompt + user query, counters at zero.
    pub fn new(system_prompt: &str, query: &str) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(query)],
            step_count: 0,
            tool_call_count: 0,
            satisfied: false,
            corp_findings: Vec::new(),
            web_findings: Vec::new(),
            confidence: 0.0,
            query: query.to_string(),
        }
    }

    /// Apply an agent step's response: append it and advance the step
    /// counter. A response with no tool requests marks the run satisfied.
    pub fn with_response(mut self, response: Message) -> Self {
        if !response.requests_tools() {
            self.satisfied = true;
        }
        self.messages.push(response);
        self.step_count += 1;
        self
    }

    /// Append a tool result message.
    pub fn with_tool_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Count a tool invocation that produced no usable output.
    pub fn with_tool_failure(mut self) -> Self {
        self.tool_call_count += 1;
        self
    }

    /// Append an injected reminder asking the agent to keep using tools.
    pub fn with_reminder(mut self, text: &str) -> Self {
        self.messages.push(Message::user(text));
        self
    }

    /// The last message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Total findings gathered (corpus + web).
    pub fn source_count(&self) -> usize {
        self.corp_findings.len() + self.web_findings.len()
    }

    /// Extract the final answer: the most recent assistant message that
    /// requests no tools and has non-empty content.
    pub fn final_answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == scour_core::message::Role::Assistant)
            .find(|m| !m.requests_tools() && !m.content.trim().is_empty())
            .map(|m| m.content.trim())
    }
}
