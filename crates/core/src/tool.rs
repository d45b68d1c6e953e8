//! Tool trait and typed tool outputs.
//!
//! Tools are what let the agent gather evidence: corpus search, web search,
//! page fetch, issue search. Each tool decodes its JSON arguments at the
//! boundary and returns a **typed** `ToolOutput` variant — the loosely-typed
//! payloads only exist on the provider wire, never inside the state machine.

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// One retrieved chunk from the internal corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusHit {
    /// The chunk text
    pub content: String,

    /// Source document name
    pub source: String,

    /// Page / sheet label within the source, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    /// Similarity to the query, in [0, 1]
    pub similarity: f32,
}

/// Pseudo-URL under which a search provider's synthesized answer travels.
/// Not a fetchable page; excluded from findings and page fetches.
pub const ANSWER_PSEUDO_URL: &str = "search:answer";

/// One web search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebHit {
    pub url: String,

    pub snippet: String,

    /// Full page body, filled in after a fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One issue-tracker search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueHit {
    pub url: String,
    pub title: String,
    pub state: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
}

/// Outcome of an issue search: the tool stays registered even when the
/// integration is unavailable, so the agent sees a payload, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IssueSearchOutcome {
    Hits(Vec<IssueHit>),
    Disabled { reason: String },
    Failed { message: String },
}

/// A fetched page body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub url: String,
    pub body: String,
}

/// Typed result of a tool execution — one variant per tool kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolOutput {
    Corpus(Vec<CorpusHit>),
    Web(Vec<WebHit>),
    Issues(IssueSearchOutcome),
    Page(PageText),
    Text(String),
}

impl ToolOutput {
    /// Render this output as the text that goes into the conversation
    /// transcript (what the LLM reads back).
    pub fn to_transcript(&self) -> String {
        match self {
            ToolOutput::Corpus(hits) => {
                serde_json::to_string(hits).unwrap_or_else(|_| "[]".into())
            }
            ToolOutput::Web(hits) => serde_json::to_string(hits).unwrap_or_else(|_| "[]".into()),
            ToolOutput::Issues(outcome) => match outcome {
                IssueSearchOutcome::Hits(items) => serde_json::json!({
                    "status": "ok",
                    "items": items,
                })
                .to_string(),
                IssueSearchOutcome::Disabled { reason } => serde_json::json!({
                    "status": "disabled",
                    "reason": reason,
                })
                .to_string(),
                IssueSearchOutcome::Failed { message } => serde_json::json!({
                    "status": "error",
                    "message": message,
                })
                .to_string(),
            },
            ToolOutput::Page(page) => page.body.clone(),
            ToolOutput::Text(text) => text.clone(),
        }
    }
}

/// The core Tool trait.
///
/// Each tool implements this trait, is registered in the ToolRegistry, and
/// made available to the agent loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "corpus_search").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolOutput, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Look up and execute tools when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool call.
    pub async fn execute(
        &self,
        call: &ToolCall,
    ) -> std::result::Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.execute(call.arguments.clone()).await
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<ToolOutput, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("").to_string();
            Ok(ToolOutput::Text(text))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_definitions() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
    }

    #[tokio::test]
    async fn registry_execute_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let call = ToolCall {
            id: "call_1".into(),
            name: "echo".into(),
            arguments: serde_json::json!({"text": "hello"}),
        };
        let output = registry.execute(&call).await.unwrap();
        assert_eq!(output.to_transcript(), "hello");
    }

    #[tokio::test]
    async fn registry_execute_missing_tool() {
        let registry = ToolRegistry::new();
        let call = ToolCall {
            id: "call_1".into(),
            name: "nonexistent".into(),
            arguments: serde_json::json!({}),
        };
        let err = registry.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn corpus_transcript_is_json_array() {
        let out = ToolOutput::Corpus(vec![CorpusHit {
            content: "usage requires a portal request".into(),
            source: "request_procedure.txt".into(),
            page: Some("1".into()),
            similarity: 0.93,
        }]);
        let text = out.to_transcript();
        assert!(text.starts_with('['));
        assert!(text.contains("request_procedure.txt"));
    }

    #[test]
    fn disabled_issues_transcript_has_status() {
        let out = ToolOutput::Issues(IssueSearchOutcome::Disabled {
            reason: "no token configured".into(),
        });
        let text = out.to_transcript();
        assert!(text.contains("\"status\":\"disabled\""));
    }

    #[test]
    fn page_transcript_is_plain_body() {
        let out = ToolOutput::Page(PageText {
            url: "https://example.com".into(),
            body: "plain text body".into(),
        });
        assert_eq!(out.to_transcript(), "plain text body");
    }
}
