//! Page fetch tool — URL body as plain text.

use crate::html::extract_text;
use crate::stub_data;
use async_trait::async_trait;
use scour_core::error::ToolError;
use scour_core::tool::{PageText, Tool, ToolOutput};
use std::time::Duration;
use tracing::{debug, info};

const FETCH_TIMEOUT_SECS: u64 = 8;
const MAX_DOC_CHARS: usize = 3200;

/// Fetches a page and strips it to readable text, truncated to a bounded
/// length. Offline (no search key) it serves the stub dataset's bodies.
pub struct FetchPageTool {
    live: bool,
    client: reqwest::Client,
}

impl FetchPageTool {
    pub fn new(live: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self { live, client }
    }

    async fn live_fetch(&self, url: &str) -> Result<String, ToolError> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "fetch_page".into(),
                    reason: format!("failed to fetch {url}: {e}"),
                })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "fetch_page".into(),
                reason: format!("{url} returned status {}", response.status().as_u16()),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "fetch_page".into(),
                reason: format!("failed to read body of {url}: {e}"),
            })?;

        Ok(extract_text(&html))
    }

    fn offline_fetch(url: &str) -> String {
        info!("SEARCH_API_KEY not set — serving stub page body");
        stub_data::offline_page_body(url)
            .map(str::to_string)
            .unwrap_or_else(|| "No offline body is available for this URL.".to_string())
    }
}

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &str {
        "fetch_page"
    }

    fn description(&self) -> &str {
        "Fetch the readable text of a web page by URL. Use after web_search \
         when a result's details are needed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let url = arguments["url"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'url' argument".into()))?;

        if self.live && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidArguments(
                "URL must start with http:// or https://".into(),
            ));
        }

        let body = if self.live {
            self.live_fetch(url).await?
        } else {
            Self::offline_fetch(url)
        };

        let body = if body.chars().count() > MAX_DOC_CHARS {
            let truncated: String = body.chars().take(MAX_DOC_CHARS).collect();
            format!("{truncated}...")
        } else {
            body
        };

        debug!(url, chars = body.chars().count(), "Fetched page body");
        Ok(ToolOutput::Page(PageText {
            url: url.to_string(),
            body,
        }))
    }
}
