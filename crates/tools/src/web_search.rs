//! Web search tool — live search API, or the offline stub dataset.

use crate::stub_data;
use async_trait::async_trait;
use scour_core::error::ToolError;
use scour_core::tool::{Tool, ToolOutput, WebHit};
use serde::Deserialize;
use tracing::{debug, info, warn};

pub use scour_core::tool::ANSWER_PSEUDO_URL as ANSWER_URL;

const SNIPPET_LIMIT: usize = 400;

/// Searches the web for supplementary information.
pub struct WebSearchTool {
    api_key: Option<String>,
    endpoint: String,
    max_results: usize,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>, max_results: usize) -> Self {
        Self {
            api_key,
            endpoint: endpoint.into(),
            max_results: max_results.clamp(1, 10),
            client: reqwest::Client::new(),
        }
    }

    async fn live_search(&self, query: &str, api_key: &str) -> Result<Vec<WebHit>, ToolError> {
        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": self.max_results,
            "include_answer": true,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: format!("search API returned status {status}"),
            });
        }

        let payload: SearchApiResponse =
            response.json().await.map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: format!("unparseable search response: {e}"),
            })?;

        let mut hits = Vec::new();
        if let Some(answer) = payload.answer.filter(|a| !a.is_empty()) {
            hits.push(WebHit {
                url: ANSWER_URL.into(),
                snippet: truncate_chars(&answer, SNIPPET_LIMIT),
                content: None,
            });
        }
        for item in payload.results {
            hits.push(WebHit {
                url: item.url,
                snippet: truncate_chars(&item.content, SNIPPET_LIMIT),
                content: None,
            });
        }
        Ok(hits)
    }

    fn stub_search(&self, query: &str) -> Vec<WebHit> {
        info!("SEARCH_API_KEY not set — serving stub web results");
        stub_data::offline_results(query)
            .iter()
            .map(|page| WebHit {
                url: page.url.to_string(),
                snippet: page.snippet.to_string(),
                content: None,
            })
            .collect()
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information the internal corpus lacks. Returns a \
         list of results with URLs and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let hits = match &self.api_key {
            Some(key) => match self.live_search(query, key).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(error = %e, "Live web search failed");
                    return Err(e);
                }
            },
            None => self.stub_search(query),
        };

        debug!(query, hits = hits.len(), "Web search complete");
        Ok(ToolOutput::Web(hits))
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}

#[derive(Deserialize)]
struct SearchApiResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchApiResult>,
}

#[derive(Deserialize)]
struct SearchApiResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}
