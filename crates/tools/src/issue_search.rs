//! Issue search tool — GitHub issues/PRs via the REST search API.
//!
//! Without a token the tool stays registered and returns a `disabled`
//! payload, so the agent learns the capability is unavailable instead of
//! hitting an error. API failures likewise become a payload, never a fault
//! in the loop.

use async_trait::async_trait;
use scour_core::error::ToolError;
use scour_core::tool::{IssueHit, IssueSearchOutcome, Tool, ToolOutput};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const API_URL: &str = "https://api.github.com/search/issues";
const BODY_LIMIT: usize = 800;
const MAX_PER_PAGE: u64 = 20;

/// Searches GitHub issues and pull requests.
pub struct IssueSearchTool {
    token: Option<String>,
    client: reqwest::Client,
}

impl IssueSearchTool {
    pub fn new(token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { token, client }
    }

    async fn search(
        &self,
        token: &str,
        query: &str,
        state: &str,
        per_page: u64,
    ) -> Result<Vec<IssueHit>, String> {
        let q = format!("{query} state:{state}");
        let response = self
            .client
            .get(API_URL)
            .query(&[("q", q.as_str()), ("per_page", &per_page.to_string())])
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "scour-agent")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!(
                "issue search returned status {}",
                response.status().as_u16()
            ));
        }

        let payload: IssueApiResponse = response
            .json()
            .await
            .map_err(|e| format!("unparseable issue search response: {e}"))?;

        Ok(payload
            .items
            .into_iter()
            .map(|item| IssueHit {
                url: item.html_url,
                title: item.title,
                state: item.state,
                body: truncate_chars(&item.body.unwrap_or_default(), BODY_LIMIT),
                number: item.number,
            })
            .collect())
    }
}

#[async_trait]
impl Tool for IssueSearchTool {
    fn name(&self) -> &str {
        "issue_search"
    }

    fn description(&self) -> &str {
        "Search GitHub issues and pull requests for technical information \
         (libraries, frameworks, known bugs, migration notes)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "state": {
                    "type": "string",
                    "description": "Issue state filter (default \"open\")",
                    "enum": ["open", "closed", "all"],
                    "default": "open"
                },
                "per_page": {
                    "type": "integer",
                    "description": "Maximum number of results (default 5)",
                    "default": 5
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let state = arguments["state"].as_str().unwrap_or("open");
        let per_page = arguments["per_page"].as_u64().unwrap_or(5).min(MAX_PER_PAGE);

        let Some(token) = &self.token else {
            debug!("Issue search requested without a token");
            return Ok(ToolOutput::Issues(IssueSearchOutcome::Disabled {
                reason: "GitHub authentication is not available".into(),
            }));
        };

        match self.search(token, query, state, per_page).await {
            Ok(hits) => {
                debug!(query, hits = hits.len(), "Issue search complete");
                Ok(ToolOutput::Issues(IssueSearchOutcome::Hits(hits)))
            }
            Err(message) => {
                warn!(error = %message, "Issue search failed");
                Ok(ToolOutput::Issues(IssueSearchOutcome::Failed { message }))
            }
        }
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
struct IssueApiResponse {
    #[serde(default)]
    items: Vec<IssueApiItem>,
}

#[derive(Deserialize)]
struct IssueApiItem {
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    number: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_token_reports_disabled() {
        let tool = IssueSearchTool::new(None);
        let output = tool
            .execute(serde_json::json!({"query": "breaking change"}))
            .await
            .unwrap();
        match output {
            ToolOutput::Issues(IssueSearchOutcome::Disabled { reason }) => {
                assert!(reason.contains("not available"));
            }
            other => panic!("expected disabled outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_query_is_invalid_arguments() {
        let tool = IssueSearchTool::new(None);
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn parse_issue_api_response() {
        let json = r#"{
            "items": [
                {
                    "html_url": "https://github.com/org/repo/issues/42",
                    "title": "Upgrade breaks routing",
                    "state": "open",
                    "body": "After upgrading, routes 404.",
                    "number": 42
                }
            ]
        }"#;
        let parsed: IssueApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].number, Some(42));
    }

    #[test]
    fn null_body_is_tolerated() {
        let json = r#"{"items": [{"html_url": "u", "title": "t", "state": "open", "body": null}]}"#;
        let parsed: IssueApiResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.items[0].body.is_none());
    }
}
