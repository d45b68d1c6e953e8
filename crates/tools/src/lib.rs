//! Built-in tools for the Scour research agent.
//!
//! Four tools cover the evidence-gathering surface:
//! - `corpus_search` — hybrid search over the internal document index
//! - `web_search` — web search API, or a labeled stub dataset offline
//! - `fetch_page` — fetch a URL's body as plain text
//! - `issue_search` — issue-tracker search, reporting `disabled` without a
//!   token rather than failing
//!
//! Each tool validates its arguments at the boundary and returns a typed
//! [`scour_core::tool::ToolOutput`].

pub mod corpus_search;
pub mod fetch_page;
pub mod html;
pub mod issue_search;
pub mod stub_data;
pub mod web_search;

pub use corpus_search::CorpusSearchTool;
pub use fetch_page::FetchPageTool;
pub use issue_search::IssueSearchTool;
pub use web_search::WebSearchTool;

use scour_core::provider::Provider;
use scour_core::tool::ToolRegistry;
use scour_retrieval::CorpusIndex;
use std::sync::Arc;

/// Wiring options for the built-in tool set.
#[derive(Debug, Clone)]
pub struct ToolSetup {
    /// Web search API key; None puts web_search and fetch_page in stub mode
    pub search_api_key: Option<String>,
    pub search_endpoint: String,
    pub search_max_results: usize,
    /// Issue-tracker token; None makes issue_search report disabled
    pub github_token: Option<String>,
    /// Embedding model for corpus query vectors
    pub embedding_model: String,
    /// Default number of corpus hits
    pub top_k: usize,
}

/// Build a registry with all four built-in tools.
pub fn builtin_registry(
    index: Arc<CorpusIndex>,
    provider: Arc<dyn Provider>,
    setup: ToolSetup,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CorpusSearchTool::new(
        index,
        provider,
        setup.embedding_model.clone(),
        setup.top_k,
    )));
    registry.register(Box::new(WebSearchTool::new(
        setup.search_api_key.clone(),
        setup.search_endpoint.clone(),
        setup.search_max_results,
    )));
    registry.register(Box::new(FetchPageTool::new(setup.search_api_key.is_some())));
    registry.register(Box::new(IssueSearchTool::new(setup.github_token)));
    registry
}
